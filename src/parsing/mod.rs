//! Loaders for the two inputs of a resolution run.
//!
//! - **Roster**: a JSON array of display names, or plain text with one name
//!   per line
//! - **Applicants**: a JSON array of applicant records, or an object with an
//!   `applicants` array
//!
//! ## Example
//!
//! ```rust
//! use handle_resolver::parsing::{applicants::parse_applicants_text, roster::parse_roster_text};
//!
//! let members = parse_roster_text("Juan Pérez\n0xAlice\n").unwrap();
//! let applicants = parse_applicants_text(r#"[{"fullName": "Juan Perez", "twitter": "@juanperez"}]"#).unwrap();
//! assert_eq!(members.len(), 2);
//! assert_eq!(applicants[0].handle().as_deref(), Some("juanperez"));
//! ```

use std::io::Read;
use std::path::Path;

use thiserror::Error;

pub mod applicants;
pub mod roster;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input format: {0}")]
    InvalidFormat(String),

    #[error("Too many entries: {0} exceeds maximum allowed ({1})")]
    TooManyEntries(usize, usize),
}

/// Read a whole input file, or stdin when `path` is `-`
///
/// # Errors
///
/// Returns `ParseError::Io` if the input cannot be read.
pub fn read_input(path: &Path) -> Result<String, ParseError> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}
