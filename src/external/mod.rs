//! Optional language-model assisted second pass.
//!
//! The model is only ever a candidate generator: every suggestion it returns
//! is routed back through the deterministic scorer and must clear a strict
//! threshold before it is accepted. Transport and decoding failures degrade
//! to "no additional matches" and never touch the deterministic assignment.
//!
//! - [`CandidateGenerator`]: the seam to the model provider
//! - [`ChatCompletionsClient`]: HTTP implementation for OpenAI-compatible APIs
//! - [`ExternalResolver`]: batching, response parsing, and re-validation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod client;
pub mod resolver;

pub use client::{ChatCompletionsClient, ClientConfig};
pub use resolver::ExternalResolver;

/// Default re-validation threshold for external suggestions
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.96;

/// Default number of unresolved members per request
pub const DEFAULT_MAX_MEMBERS: usize = 40;

/// Default number of applicants projected into a request
pub const DEFAULT_MAX_CANDIDATES: usize = 200;

#[derive(Error, Debug)]
pub enum ExternalError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Provider response had no content")]
    EmptyResponse,

    #[error("No API key configured")]
    MissingApiKey,
}

/// Source of candidate suggestions for unresolved members.
///
/// Implementations return the provider's raw text; the resolver owns parsing
/// and validation so a misbehaving provider cannot bypass either.
#[async_trait]
pub trait CandidateGenerator: Send + Sync {
    /// Ask for matches for `request.members` among `request.candidates`.
    async fn suggest(&self, request: &ResolverRequest) -> Result<String, ExternalError>;
}

/// Condensed applicant projection sent to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    /// Position of the applicant in the original list
    pub i: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Cleaned handle
    pub twitter: String,
}

/// One request to the model provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverRequest {
    pub members: Vec<String>,
    pub candidates: Vec<CandidateSummary>,
    pub instructions: String,
}

/// One `{member, twitter}` pair proposed by the model
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuggestedMatch {
    pub member: String,
    pub twitter: String,
}

/// How several valid suggestions for the same handle within a batch are settled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExternalPolicy {
    /// First suggestion in the model's output order wins
    #[default]
    FirstMatch,
    /// Highest re-validated score wins, like the deterministic assigner
    ScoreOrdered,
}

/// Operating point for the external pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolverConfig {
    pub acceptance_threshold: f64,
    pub max_members: usize,
    pub max_candidates: usize,
    pub policy: ExternalPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            max_members: DEFAULT_MAX_MEMBERS,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            policy: ExternalPolicy::default(),
        }
    }
}
