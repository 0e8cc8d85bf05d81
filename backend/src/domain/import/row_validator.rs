use super::header_normalizer::{canonical_header, NormalizedRow, BATCH, NAME, REG_NO};
use super::ImportError;

/// Fields every imported row must carry
pub const REQUIRED_FIELDS: [&str; 3] = [REG_NO, NAME, BATCH];

/// A row is importable only when every required field holds a non-blank value.
/// Returns the first missing field otherwise.
pub fn missing_required_field(row: &NormalizedRow) -> Option<&'static str> {
    REQUIRED_FIELDS
        .into_iter()
        .find(|field| row.value(field).is_none())
}

/// Reject a sheet whose headers cannot supply the required fields at all
pub fn check_schema<'a, I>(headers: I) -> Result<(), ImportError>
where
    I: IntoIterator<Item = &'a String>,
{
    let canonical: Vec<String> = headers.into_iter().map(|h| canonical_header(h)).collect();
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !canonical.iter().any(|h| h.as_str() == **field))
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ImportError::Schema { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(fields: &[(&str, &str)]) -> NormalizedRow {
        NormalizedRow {
            row_number: 2,
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_complete_row_is_valid() {
        let r = row(&[(REG_NO, "TN21SDA1"), (NAME, "Arun"), (BATCH, "abc")]);
        assert_eq!(missing_required_field(&r), None);
    }

    #[test]
    fn test_missing_or_blank_fields_are_reported() {
        assert_eq!(
            missing_required_field(&row(&[(NAME, "Arun"), (BATCH, "2021")])),
            Some(REG_NO)
        );
        assert_eq!(
            missing_required_field(&row(&[(REG_NO, "R1"), (NAME, "  "), (BATCH, "2021")])),
            Some(NAME)
        );
        assert_eq!(
            missing_required_field(&row(&[(REG_NO, "R1"), (NAME, "Arun"), (BATCH, "")])),
            Some(BATCH)
        );
    }

    #[test]
    fn test_schema_check_uses_synonyms() {
        let headers: Vec<String> = ["Regimental No", "Cadet Name", "Year"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(check_schema(&headers).is_ok());

        let headers = vec!["Name".to_string(), "Rank".to_string()];
        match check_schema(&headers) {
            Err(ImportError::Schema { missing }) => assert_eq!(missing, vec!["regNo", "batch"]),
            other => panic!("expected schema error, got {:?}", other),
        }
    }
}
