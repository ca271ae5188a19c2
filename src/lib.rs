//! # handle-resolver
//!
//! A library for mapping community-member display names to the social
//! handles of verified applicants.
//!
//! Community rosters record people however they chose to type their name:
//! with accents or without, as one word or two, as a wallet prefix, or as
//! their Discord tag. Applicant records hold the same people under full
//! names, usernames, emails and handles. `handle-resolver` links the two
//! with deterministic, auditable heuristics.
//!
//! ## Features
//!
//! - **Normalization**: Unicode-aware folding to lowercase ASCII alphanumerics
//! - **Layered scoring**: exact and substring key hits, Levenshtein
//!   similarity, and Jaccard similarity over expanded token sets
//! - **Margin gate**: a member is only matched when the winner is clearly
//!   ahead of the runner-up
//! - **Injective assignment**: conflicts are settled greedily by score, so a
//!   handle is never given to two members
//! - **Assisted second pass**: an optional language model proposes matches
//!   for leftovers; each proposal is re-scored before it is accepted
//!
//! ## Example
//!
//! ```rust
//! use handle_resolver::{ApplicantRecord, ResolutionEngine};
//!
//! let applicants = vec![
//!     ApplicantRecord {
//!         full_name: Some("Juan Perez".to_string()),
//!         twitter: Some("@juanperez".to_string()),
//!         ..Default::default()
//!     },
//!     ApplicantRecord {
//!         wallet_address: Some("0xAlice123".to_string()),
//!         twitter: Some("https://x.com/alice_eth".to_string()),
//!         ..Default::default()
//!     },
//! ];
//!
//! let engine = ResolutionEngine::new(&applicants);
//! let members = vec!["Juan Pérez".to_string(), "0xAlice".to_string()];
//! let resolution = engine.resolve(&members).unwrap();
//!
//! for entry in resolution.assignment.entries() {
//!     println!("{} -> @{} ({:.2})", entry.member, entry.handle, entry.score);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Applicant records and shared enums
//! - [`matching`]: Normalization, features, scoring, selection, assignment
//! - [`external`]: Language-model assisted second pass
//! - [`parsing`]: Roster and applicant loaders
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod external;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::applicant::ApplicantRecord;
pub use core::types::*;
pub use external::{CandidateGenerator, ExternalPolicy, ExternalResolver, ResolverConfig};
pub use matching::assignment::{Assignment, AssignmentEntry, AssignmentError};
pub use matching::engine::{Resolution, ResolutionEngine};
pub use matching::scoring::{score, PairScore};
pub use matching::selector::SelectorConfig;
