use std::collections::HashSet;

use serde::Serialize;

use crate::core::applicant::ApplicantRecord;
use crate::core::types::Confidence;
use crate::matching::features::{ApplicantFeatures, MemberFeatures, MIN_KEY_LEN};

/// Score floor for a candidate key that equals the member key
pub const EXACT_BASE: f64 = 1.0;

/// Score floor for a candidate key that contains, or is contained in, the member key
pub const INCLUDES_BASE: f64 = 0.97;

/// Safely convert usize to f64 for ratio calculations
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Confidence that a member and an applicant are the same person, with components
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairScore {
    /// Some candidate key equals the normalized member name
    pub exact: bool,

    /// Some candidate key is a substring of the member key, or vice versa
    pub includes: bool,

    /// Best normalized Levenshtein similarity over candidate keys
    pub str_sim: f64,

    /// Jaccard similarity of the two token sets
    pub tok_sim: f64,

    /// Final score in `[0, 1]`
    pub score: f64,

    pub confidence: Confidence,
}

impl PairScore {
    /// Score a member against an applicant from precomputed features.
    ///
    /// Exact and substring hits set a floor (1.0 or 0.97) that string and
    /// token similarity can only raise.
    #[must_use]
    pub fn calculate(member: &MemberFeatures, applicant: &ApplicantFeatures) -> Self {
        let member_key = member.key.as_str();
        let has_key = !member_key.is_empty();

        let exact = has_key && applicant.keys.contains(member_key);
        let includes = has_key
            && applicant.keys.iter().any(|k| {
                k.len() >= MIN_KEY_LEN && (member_key.contains(k.as_str()) || k.contains(member_key))
            });

        let base = if exact {
            EXACT_BASE
        } else if includes {
            INCLUDES_BASE
        } else {
            0.0
        };

        let str_sim = applicant
            .keys
            .iter()
            .map(|k| string_similarity(k, member_key))
            .fold(0.0, f64::max);
        let tok_sim = jaccard_similarity(&member.tokens, &applicant.tokens);

        let score = if exact || includes {
            base.max(str_sim).max(tok_sim)
        } else {
            str_sim.max(tok_sim)
        };

        Self {
            exact,
            includes,
            str_sim,
            tok_sim,
            score,
            confidence: Confidence::from_score(score),
        }
    }
}

/// Score one member display name against one applicant record.
///
/// Returns `None` when the applicant exposes no usable handle and therefore
/// cannot be a match candidate. Callers scoring many pairs should build
/// features once and use [`PairScore::calculate`].
#[must_use]
pub fn score(member: &str, applicant: &ApplicantRecord) -> Option<PairScore> {
    let applicant = ApplicantFeatures::build(0, applicant)?;
    Some(PairScore::calculate(&MemberFeatures::build(member), &applicant))
}

/// `1 - levenshtein(a, b) / max(|a|, |b|)`; two empty strings are identical.
#[must_use]
pub fn string_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Jaccard similarity: |A ∩ B| / |A ∪ B|
///
/// Two empty sets are identical (1.0); one empty set shares nothing (0.0).
#[must_use]
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    count_to_f64(intersection) / count_to_f64(union)
}
