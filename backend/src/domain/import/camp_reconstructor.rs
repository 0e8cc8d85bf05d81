//! Rebuilds the nested camp list from flattened `camp{N}_*` columns.

use std::collections::BTreeSet;
use tracing::debug;

use super::header_normalizer::NormalizedRow;
use crate::domain::models::{Camp, CampType};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconstructedCamps {
    pub camps: Vec<Camp>,
    /// True when the row carries any `camp{N}_type` column, even an empty one
    pub has_camp_columns: bool,
    /// `(index, value)` of type cells that name no known camp type
    pub unknown_types: Vec<(u32, String)>,
    /// Indices above the configured maximum that were skipped
    pub beyond_limit: Vec<u32>,
}

fn camp_index(field: &str) -> Option<u32> {
    field
        .strip_prefix("camp")?
        .strip_suffix("_type")?
        .parse()
        .ok()
        .filter(|index| *index >= 1)
}

/// Scan every `camp{N}_type` column present, in ascending N. Durations are
/// left at 0; they are only computed on interactive edits.
pub fn reconstruct(row: &NormalizedRow, max_camp_index: u32) -> ReconstructedCamps {
    let indices: BTreeSet<u32> = row.fields.keys().filter_map(|k| camp_index(k)).collect();
    let mut result = ReconstructedCamps {
        has_camp_columns: !indices.is_empty(),
        ..Default::default()
    };

    for index in indices {
        let field = |name: &str| row.value(&format!("camp{}_{}", index, name)).map(str::to_string);

        let Some(raw_type) = field("type") else {
            continue;
        };
        if index > max_camp_index {
            result.beyond_limit.push(index);
            continue;
        }
        let Some(camp_type) = CampType::from_code(&raw_type) else {
            debug!("Row {}: unknown camp type '{}' in camp{}", row.row_number, raw_type, index);
            result.unknown_types.push((index, raw_type));
            continue;
        };

        result.camps.push(Camp {
            camp_type,
            level: field("level"),
            location: field("location").unwrap_or_default(),
            start_date: field("startDate").unwrap_or_default(),
            end_date: field("endDate").unwrap_or_default(),
            duration_days: 0,
            reward: field("reward"),
            certificate_url: field("certificateUrl"),
        });
    }

    result
}
