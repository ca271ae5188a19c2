//! Deterministic identity-resolution pipeline.
//!
//! - [`normalize`]: canonical comparable forms of names and handles
//! - [`features`]: candidate keys and token sets per entity
//! - [`scoring`]: confidence score for one (member, applicant) pair
//! - [`selector`]: per-member ranking with a threshold + margin gate
//! - [`assignment`]: greedy, score-ordered, injective assignment
//! - [`engine`]: [`ResolutionEngine`] tying the stages together
//! - [`diagnosis`]: audit records for members left unassigned
//!
//! ## Scoring
//!
//! A pair score is the maximum of:
//!
//! - **Key tier**: 1.0 if a candidate key equals the normalized member name,
//!   0.97 if one contains the other
//! - **String similarity**: best normalized Levenshtein similarity over keys
//! - **Token similarity**: Jaccard similarity of expanded token sets
//!
//! ## Example
//!
//! ```rust
//! use handle_resolver::{ApplicantRecord, ResolutionEngine};
//!
//! let applicants = vec![ApplicantRecord {
//!     full_name: Some("Juan Perez".to_string()),
//!     twitter: Some("@juanperez".to_string()),
//!     ..Default::default()
//! }];
//!
//! let engine = ResolutionEngine::new(&applicants);
//! let resolution = engine.resolve(&["Juan Pérez".to_string()]).unwrap();
//! assert_eq!(resolution.assignment.get("Juan Pérez"), Some("juanperez"));
//! ```

pub mod assignment;
pub mod diagnosis;
pub mod engine;
pub mod features;
pub mod normalize;
pub mod scoring;
pub mod selector;

pub use assignment::{Assignment, AssignmentEntry, AssignmentError};
pub use engine::{Resolution, ResolutionEngine};
pub use scoring::{score, PairScore};
pub use selector::{MatchProposal, SelectorConfig};
