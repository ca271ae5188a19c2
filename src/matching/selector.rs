use std::cmp::Ordering;

use serde::Serialize;

use crate::matching::diagnosis::{RejectReason, Rejection, ScoreSnapshot};
use crate::matching::features::{ApplicantFeatures, MemberFeatures};
use crate::matching::scoring::PairScore;

/// Default minimum score for the deterministic pass
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Default minimum gap between the best and second-best candidate
pub const DEFAULT_MARGIN_THRESHOLD: f64 = 0.06;

/// Absorbs float noise in threshold comparisons (`0.86 - 0.80` is not exactly `0.06`)
const EPSILON: f64 = 1e-9;

/// Operating point for the per-member acceptance gate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectorConfig {
    pub similarity_threshold: f64,
    pub margin_threshold: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            margin_threshold: DEFAULT_MARGIN_THRESHOLD,
        }
    }
}

/// One applicant scored against one member
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    /// Position of the applicant in the original applicant list
    pub applicant: usize,
    pub handle: String,
    pub handle_key: String,
    pub score: PairScore,
}

impl ScoredCandidate {
    #[must_use]
    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            handle: self.handle.clone(),
            score: self.score.score,
        }
    }
}

/// A member that cleared the gate, with its best candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchProposal {
    pub member: String,
    /// Position of the member in the roster; tie-breaker for the assigner
    pub member_index: usize,
    pub handle: String,
    pub applicant: usize,
    pub score: f64,
    /// Second-ranked candidate, kept for the audit trail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runner_up: Option<ScoreSnapshot>,
}

/// Outcome of the gate for one member
#[derive(Debug, Clone)]
pub enum Selection {
    Accepted(MatchProposal),
    Rejected(Rejection),
}

/// Score a member against every applicant and rank the results.
///
/// Order is score descending, then handle key ascending, then applicant
/// position, so ties never depend on incidental iteration order.
#[must_use]
pub fn rank_candidates(
    member: &MemberFeatures,
    applicants: &[ApplicantFeatures],
) -> Vec<ScoredCandidate> {
    let mut ranked: Vec<ScoredCandidate> = applicants
        .iter()
        .map(|a| ScoredCandidate {
            applicant: a.index,
            handle: a.handle.clone(),
            handle_key: a.handle_key.clone(),
            score: PairScore::calculate(member, a),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .score
            .partial_cmp(&a.score.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.handle_key.cmp(&b.handle_key))
            .then_with(|| a.applicant.cmp(&b.applicant))
    });
    ranked
}

/// Apply the threshold + margin gate to a ranked candidate list.
///
/// The runner-up is the second entry of `ranked`, whatever its handle.
/// A blank member name is rejected before any candidate is considered.
#[must_use]
pub fn select(
    member: &str,
    member_index: usize,
    ranked: &[ScoredCandidate],
    config: &SelectorConfig,
) -> Selection {
    if member.trim().is_empty() {
        return Selection::Rejected(Rejection {
            member: member.to_string(),
            reason: RejectReason::EmptyName,
            top: None,
            runner_up: None,
        });
    }
    let Some(top) = ranked.first() else {
        return Selection::Rejected(Rejection {
            member: member.to_string(),
            reason: RejectReason::NoCandidates,
            top: None,
            runner_up: None,
        });
    };
    let runner_up = ranked.get(1);

    let reject = |reason| {
        Selection::Rejected(Rejection {
            member: member.to_string(),
            reason,
            top: Some(top.snapshot()),
            runner_up: runner_up.map(ScoredCandidate::snapshot),
        })
    };

    if top.score.score + EPSILON < config.similarity_threshold {
        return reject(RejectReason::BelowThreshold);
    }
    if let Some(second) = runner_up {
        if top.score.score - second.score.score + EPSILON < config.margin_threshold {
            return reject(RejectReason::AmbiguousMargin);
        }
    }

    Selection::Accepted(MatchProposal {
        member: member.to_string(),
        member_index,
        handle: top.handle.clone(),
        applicant: top.applicant,
        score: top.score.score,
        runner_up: runner_up.map(ScoredCandidate::snapshot),
    })
}
