//! Input size limits.

use crate::parsing::ParseError;

/// Maximum number of roster entries accepted in one run
pub const MAX_MEMBERS: usize = 100_000;

/// Maximum number of applicant records accepted in one run
pub const MAX_APPLICANTS: usize = 100_000;

/// Check a parsed collection against its size limit.
///
/// # Errors
///
/// Returns `ParseError::TooManyEntries` if `count` exceeds `max`.
pub fn check_entry_limit(count: usize, max: usize) -> Result<(), ParseError> {
    if count > max {
        Err(ParseError::TooManyEntries(count, max))
    } else {
        Ok(())
    }
}
