//! Command-line interface for handle-resolver.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **resolve**: Map a member roster to applicant handles
//! - **score**: Explain how one member scores against every applicant
//!
//! ## Usage
//!
//! ```text
//! # Deterministic pass only
//! handle-resolver resolve members.txt applicants.json
//!
//! # Only approved applicants, JSON output
//! handle-resolver resolve members.json applicants.json --status approved --format json
//!
//! # Ask a language model about members the deterministic pass left unresolved
//! HANDLE_RESOLVER_API_KEY=... handle-resolver resolve members.txt applicants.json --external
//!
//! # Why did a member match (or not)?
//! handle-resolver score "Juan Pérez" applicants.json
//! ```

use clap::{Parser, Subcommand};

pub mod resolve;
pub mod score;

#[derive(Parser)]
#[command(name = "handle-resolver")]
#[command(version)]
#[command(about = "Resolve community member names to verified applicant handles")]
#[command(
    long_about = "handle-resolver maps a roster of community display names to the social handles of verified applicants.\n\nIt scores every member against every applicant with layered string-similarity heuristics and then:\n- Accepts a member only when the best match is confident and clearly ahead of the runner-up\n- Resolves conflicts so each handle is assigned at most once\n- Optionally asks a language model about leftovers, re-validating every suggestion"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a member roster against applicant records
    Resolve(resolve::ResolveArgs),

    /// Score one member against every applicant
    Score(score::ScoreArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
