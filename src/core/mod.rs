//! Core data types for identity resolution.
//!
//! - [`ApplicantRecord`]: an immutable snapshot of one verified applicant
//! - [`MatchSource`]: whether an assignment came from the deterministic pass
//!   or from a re-validated external suggestion
//! - [`Confidence`]: display bucket for a pair score
//!
//! Members are plain display-name strings and have no wrapper type; their
//! identity is the raw string.

pub mod applicant;
pub mod types;

pub use applicant::ApplicantRecord;
pub use types::{Confidence, MatchSource};
