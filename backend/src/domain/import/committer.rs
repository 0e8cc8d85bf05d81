use tracing::{error, info};

use super::reconciler::UpsertPlan;
use super::ImportError;
use crate::domain::listing_revisions::ListingRevisions;
use crate::storage::CadetStorage;

/// Write the whole plan in one atomic batch and invalidate the institution's
/// listing. Returns the number of records written.
pub async fn commit<S: CadetStorage>(
    cadets: &S,
    revisions: &ListingRevisions,
    institution_id: &str,
    plan: &UpsertPlan,
) -> Result<usize, ImportError> {
    let written = cadets
        .commit_batch(institution_id, &plan.writes)
        .await
        .map_err(|e| {
            error!("❌ Batch commit for {} failed: {:#}", institution_id, e);
            ImportError::Commit(format!("{:#}", e))
        })?;

    let revision = revisions.invalidate(institution_id);
    info!(
        "💾 Committed {} cadets for {} (listing revision {})",
        written, institution_id, revision
    );
    Ok(written)
}
