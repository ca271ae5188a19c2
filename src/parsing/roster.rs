use std::path::Path;

use serde_json::Value;

use crate::core::applicant::stringify;
use crate::parsing::{read_input, ParseError};
use crate::utils::validation::{check_entry_limit, MAX_MEMBERS};

/// Load a member roster from a file (`-` for stdin)
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_roster_file(path: &Path) -> Result<Vec<String>, ParseError> {
    parse_roster_text(&read_input(path)?)
}

/// Parse a roster from text.
///
/// Text starting with `[` is read as a JSON array; non-string entries are
/// stringified and `null` entries skipped. Anything else is read as one
/// display name per line with surrounding whitespace removed and blank lines
/// dropped. Roster order is preserved and duplicates are kept.
///
/// # Errors
///
/// Returns `ParseError::Json` for an invalid JSON array, or
/// `ParseError::TooManyEntries` if the roster exceeds [`MAX_MEMBERS`].
pub fn parse_roster_text(text: &str) -> Result<Vec<String>, ParseError> {
    let members: Vec<String> = if text.trim_start().starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(text)?;
        values
            .into_iter()
            .filter_map(stringify)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    } else {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    };

    check_entry_limit(members.len(), MAX_MEMBERS)?;
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text_roster() {
        let members = parse_roster_text("  Juan Pérez \n\n0xAlice\r\ncryptoDan\n").unwrap();
        assert_eq!(members, vec!["Juan Pérez", "0xAlice", "cryptoDan"]);
    }

    #[test]
    fn test_parse_json_roster() {
        let members = parse_roster_text(r#"["Dan", 42, null, " ", "Daniel"]"#).unwrap();
        assert_eq!(members, vec!["Dan", "42", "Daniel"]);
    }

    #[test]
    fn test_invalid_json_roster() {
        assert!(matches!(
            parse_roster_text("[\"unterminated"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_empty_roster() {
        assert!(parse_roster_text("").unwrap().is_empty());
    }
}
