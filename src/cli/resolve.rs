use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::types::Confidence;
use crate::external::client::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECONDS};
use crate::external::{
    ChatCompletionsClient, ClientConfig, ExternalPolicy, ExternalResolver, ResolverConfig,
    DEFAULT_ACCEPTANCE_THRESHOLD,
};
use crate::matching::engine::{Resolution, ResolutionEngine};
use crate::matching::selector::{
    SelectorConfig, DEFAULT_MARGIN_THRESHOLD, DEFAULT_SIMILARITY_THRESHOLD,
};
use crate::parsing::applicants::{filter_by_status, parse_applicants_file};
use crate::parsing::roster::parse_roster_file;

#[derive(Args)]
pub struct ResolveArgs {
    /// Member roster: JSON array of names, or one name per line.
    /// Use '-' for stdin
    #[arg(required = true)]
    pub members: PathBuf,

    /// Applicant records (JSON)
    #[arg(required = true)]
    pub applicants: PathBuf,

    /// Only consider applicants with this status (case-insensitive)
    #[arg(long)]
    pub status: Option<String>,

    /// Minimum score for a deterministic match
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    pub threshold: f64,

    /// Minimum gap between the best and second-best score
    #[arg(long, default_value_t = DEFAULT_MARGIN_THRESHOLD)]
    pub margin: f64,

    // === External resolver options ===
    /// Ask a language model about members left unresolved
    #[arg(long)]
    pub external: bool,

    /// Minimum re-validated score for an external suggestion
    #[arg(long, default_value_t = DEFAULT_ACCEPTANCE_THRESHOLD)]
    pub external_threshold: f64,

    /// How competing external suggestions for one handle are settled
    #[arg(long, value_enum, default_value = "first-match")]
    pub external_policy: ExternalPolicy,

    /// Chat completion model name
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// API key for the language model provider
    #[arg(long, env = "HANDLE_RESOLVER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout: u64,
}

/// Execute resolve subcommand
///
/// # Errors
///
/// Returns an error if the inputs cannot be parsed, the thresholds are out
/// of range, or an internal invariant breaks.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ResolveArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    for (name, value) in [
        ("--threshold", args.threshold),
        ("--margin", args.margin),
        ("--external-threshold", args.external_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            anyhow::bail!("{name} must be between 0 and 1, got {value}");
        }
    }

    let members = parse_roster_file(&args.members)?;
    let mut applicants = parse_applicants_file(&args.applicants)?;
    if let Some(status) = &args.status {
        applicants = filter_by_status(applicants, status);
    }

    let config = SelectorConfig {
        similarity_threshold: args.threshold,
        margin_threshold: args.margin,
    };
    let engine = ResolutionEngine::with_config(&applicants, config);

    if verbose {
        eprintln!(
            "Loaded {} members and {} applicants ({} with a handle)",
            members.len(),
            applicants.len(),
            engine.applicants().len()
        );
    }

    let mut resolution = engine.resolve(&members)?;

    if args.external {
        resolution = run_external(&args, &engine, resolution)?;
    }

    match format {
        OutputFormat::Text => print_text_results(&resolution, verbose),
        OutputFormat::Json => print_json_results(&resolution)?,
        OutputFormat::Tsv => print_tsv_results(&resolution),
    }

    Ok(())
}

fn run_external(
    args: &ResolveArgs,
    engine: &ResolutionEngine,
    resolution: Resolution,
) -> anyhow::Result<Resolution> {
    let client_config = ClientConfig {
        base_url: args.base_url.clone(),
        model: args.model.clone(),
        api_key: args.api_key.clone().unwrap_or_default(),
        timeout_seconds: args.timeout,
    };
    let client = match ChatCompletionsClient::new(client_config) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("External resolver unavailable: {e}");
            return Ok(resolution);
        }
    };

    let resolver = ExternalResolver::with_config(
        client,
        ResolverConfig {
            acceptance_threshold: args.external_threshold,
            policy: args.external_policy,
            ..Default::default()
        },
    );

    let rt = tokio::runtime::Runtime::new()?;
    Ok(rt.block_on(resolver.extend(engine, resolution))?)
}

fn print_text_results(resolution: &Resolution, verbose: bool) {
    let assignment = &resolution.assignment;
    println!(
        "Assigned {} of {} members",
        assignment.len(),
        resolution.members.len()
    );

    if !assignment.is_empty() {
        println!();
        for entry in assignment.entries() {
            let confidence = match Confidence::from_score(entry.score) {
                Confidence::Exact => "EXACT",
                Confidence::High => "HIGH",
                Confidence::Medium => "MEDIUM",
                Confidence::Low => "LOW",
            };
            println!(
                "   {} -> @{} ({:.1}%, {}, {})",
                entry.member,
                entry.handle,
                entry.score * 100.0,
                confidence,
                entry.source
            );
        }
    }

    let unresolved = resolution.unresolved();
    if !unresolved.is_empty() {
        println!("\nUnresolved ({}):", unresolved.len());
        for member in &unresolved {
            let reason = resolution
                .rejections
                .iter()
                .rev()
                .find(|r| &r.member == member);
            match reason {
                Some(r) => {
                    let mut line = format!("   {member}: {}", r.reason);
                    if let Some(top) = &r.top {
                        line.push_str(&format!(" (best @{} {:.3}", top.handle, top.score));
                        if let Some(second) = &r.runner_up {
                            line.push_str(&format!(", next @{} {:.3}", second.handle, second.score));
                        }
                        line.push(')');
                    }
                    println!("{line}");
                }
                None => println!("   {member}"),
            }
        }
    }

    if verbose && !resolution.external_rejections.is_empty() {
        println!("\nRejected external suggestions:");
        for r in &resolution.external_rejections {
            println!("   {} -> @{}: {}", r.member, r.handle, r.reason);
        }
    }
}

fn print_json_results(resolution: &Resolution) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "members": resolution.members.len(),
        "assigned": resolution.assignment.len(),
        "assignments": resolution.assignment.entries(),
        "unresolved": resolution.unresolved(),
        "rejections": resolution.rejections,
        "external_rejections": resolution.external_rejections,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(resolution: &Resolution) {
    println!("member\thandle\tscore\tconfidence\tsource");
    for entry in resolution.assignment.entries() {
        println!(
            "{}\t{}\t{:.4}\t{:?}\t{}",
            entry.member,
            entry.handle,
            entry.score,
            Confidence::from_score(entry.score),
            entry.source
        );
    }
}
