use std::path::Path;

use serde_json::Value;
use tracing::warn;

use crate::core::applicant::ApplicantRecord;
use crate::parsing::{read_input, ParseError};
use crate::utils::validation::{check_entry_limit, MAX_APPLICANTS};

/// Load applicant records from a JSON file (`-` for stdin)
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_applicants_file(path: &Path) -> Result<Vec<ApplicantRecord>, ParseError> {
    parse_applicants_text(&read_input(path)?)
}

/// Parse applicant records from JSON text.
///
/// Accepts a top-level array or an object with an `applicants` array.
/// Entries that are not objects are skipped with a warning.
///
/// # Errors
///
/// Returns `ParseError::Json` for invalid JSON, `ParseError::InvalidFormat`
/// for any other top-level shape, or `ParseError::TooManyEntries` past
/// [`MAX_APPLICANTS`].
pub fn parse_applicants_text(text: &str) -> Result<Vec<ApplicantRecord>, ParseError> {
    let entries = match serde_json::from_str::<Value>(text)? {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("applicants") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(ParseError::InvalidFormat(
                    "expected an array or an object with an 'applicants' array".to_string(),
                ))
            }
        },
        _ => {
            return Err(ParseError::InvalidFormat(
                "expected an array of applicant records".to_string(),
            ))
        }
    };

    check_entry_limit(entries.len(), MAX_APPLICANTS)?;

    let mut records = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        if !entry.is_object() {
            warn!("Skipping applicant entry {i}: not an object");
            continue;
        }
        records.push(serde_json::from_value(entry)?);
    }
    Ok(records)
}

/// Keep only records whose status matches `status` (case-insensitive)
#[must_use]
pub fn filter_by_status(records: Vec<ApplicantRecord>, status: &str) -> Vec<ApplicantRecord> {
    records.into_iter().filter(|r| r.has_status(status)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array() {
        let records = parse_applicants_text(
            r#"[{"fullName": "Juan Perez", "twitter": "@juanperez"}, 7, {"x": "alice"}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].handle().as_deref(), Some("alice"));
    }

    #[test]
    fn test_parse_wrapped_object() {
        let records =
            parse_applicants_text(r#"{"applicants": [{"name": "Dan", "status": "approved"}]}"#)
                .unwrap();
        assert_eq!(records[0].name.as_deref(), Some("Dan"));
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert!(matches!(
            parse_applicants_text(r#"{"people": []}"#),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_applicants_text("\"text\""),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_applicants_text("{oops"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_filter_by_status() {
        let records = parse_applicants_text(
            r#"[{"name": "a", "status": "Approved"}, {"name": "b", "status": "rejected"}, {"name": "c"}]"#,
        )
        .unwrap();
        let approved = filter_by_status(records, "approved");
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].name.as_deref(), Some("a"));
    }
}
