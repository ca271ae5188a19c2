//! Score command - explain how one member scores against every applicant.
//!
//! Candidates are listed in the order the selector ranks them, with the
//! components that make up each score.

use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::matching::engine::ResolutionEngine;
use crate::matching::selector::{select, ScoredCandidate, Selection};
use crate::parsing::applicants::{filter_by_status, parse_applicants_file};

/// Arguments for the score command
#[derive(Args)]
pub struct ScoreArgs {
    /// Member display name
    #[arg(required = true)]
    pub member: String,

    /// Applicant records (JSON)
    #[arg(required = true)]
    pub applicants: PathBuf,

    /// Only consider applicants with this status (case-insensitive)
    #[arg(long)]
    pub status: Option<String>,

    /// Number of candidates to show
    #[arg(short = 'n', long, default_value = "5")]
    pub max_candidates: usize,
}

/// Execute the score command
///
/// # Errors
///
/// Returns an error if the applicants cannot be parsed.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: ScoreArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut applicants = parse_applicants_file(&args.applicants)?;
    if let Some(status) = &args.status {
        applicants = filter_by_status(applicants, status);
    }

    let engine = ResolutionEngine::new(&applicants);
    if verbose {
        eprintln!(
            "Scoring '{}' against {} applicants with a handle",
            args.member,
            engine.applicants().len()
        );
    }

    let ranked = engine.rank(&args.member);
    let verdict = match select(&args.member, 0, &ranked, engine.config()) {
        Selection::Accepted(p) => format!("accepted: @{}", p.handle),
        Selection::Rejected(r) => format!("rejected: {}", r.reason),
    };
    let shown = &ranked[..ranked.len().min(args.max_candidates)];

    match format {
        OutputFormat::Text => print_text(&args.member, &verdict, shown),
        OutputFormat::Json => print_json(&args.member, &verdict, shown)?,
        OutputFormat::Tsv => print_tsv(shown),
    }
    Ok(())
}

fn print_text(member: &str, verdict: &str, ranked: &[ScoredCandidate]) {
    println!("{member}: {verdict}");
    for (i, c) in ranked.iter().enumerate() {
        let tier = if c.score.exact {
            "exact"
        } else if c.score.includes {
            "substring"
        } else {
            "fuzzy"
        };
        println!(
            "   #{} @{} {:.3} ({tier}; string {:.3}, tokens {:.3})",
            i + 1,
            c.handle,
            c.score.score,
            c.score.str_sim,
            c.score.tok_sim
        );
    }
}

fn print_json(member: &str, verdict: &str, ranked: &[ScoredCandidate]) -> anyhow::Result<()> {
    let candidates: Vec<serde_json::Value> = ranked
        .iter()
        .map(|c| {
            serde_json::json!({
                "handle": c.handle,
                "applicant": c.applicant,
                "score": c.score,
            })
        })
        .collect();
    let output = serde_json::json!({
        "member": member,
        "verdict": verdict,
        "candidates": candidates,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(ranked: &[ScoredCandidate]) {
    println!("rank\thandle\tscore\texact\tincludes\tstr_sim\ttok_sim\tconfidence");
    for (i, c) in ranked.iter().enumerate() {
        println!(
            "{}\t{}\t{:.4}\t{}\t{}\t{:.4}\t{:.4}\t{:?}",
            i + 1,
            c.handle,
            c.score.score,
            c.score.exact,
            c.score.includes,
            c.score.str_sim,
            c.score.tok_sim,
            c.score.confidence
        );
    }
}
