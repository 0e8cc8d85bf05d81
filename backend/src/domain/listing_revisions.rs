//! Per-institution revision counters used to invalidate cached listings.
//!
//! Every mutation of an institution's cadets bumps its revision. The REST
//! layer exposes the revision as an `ETag` on the cadet listing, so clients
//! holding a stale page learn about the change on their next request.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct ListingRevisions {
    /// Start time of this registry; keeps tags from a previous process run from matching
    epoch: i64,
    revisions: Arc<Mutex<HashMap<String, u64>>>,
}

impl Default for ListingRevisions {
    fn default() -> Self {
        Self {
            epoch: Utc::now().timestamp_millis(),
            revisions: Arc::default(),
        }
    }
}

impl ListingRevisions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self, institution_id: &str) -> u64 {
        let revisions = self.revisions.lock().unwrap_or_else(|p| p.into_inner());
        revisions.get(institution_id).copied().unwrap_or(0)
    }

    /// Mark the listing of an institution as changed and return the new revision
    pub fn invalidate(&self, institution_id: &str) -> u64 {
        let mut revisions = self.revisions.lock().unwrap_or_else(|p| p.into_inner());
        let revision = revisions.entry(institution_id.to_string()).or_insert(0);
        *revision += 1;
        debug!("Listing for {} invalidated (revision {})", institution_id, revision);
        *revision
    }

    pub fn etag(&self, institution_id: &str) -> String {
        format!("\"{}-rev-{}\"", self.epoch, self.current(institution_id))
    }
}
