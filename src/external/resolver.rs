use std::cmp::Ordering;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::types::MatchSource;
use crate::external::{
    CandidateGenerator, CandidateSummary, ExternalPolicy, ResolverConfig, ResolverRequest,
    SuggestedMatch,
};
use crate::matching::assignment::{Assignment, AssignmentError, Commit};
use crate::matching::diagnosis::{ExternalRejectReason, ExternalRejection};
use crate::matching::engine::{Resolution, ResolutionEngine};
use crate::matching::normalize::{clean_handle, normalize};

/// Instructions sent with every request
pub const INSTRUCTIONS: &str = "You match community members to applicants. \
Each member is a display name from a community roster. Each candidate is an applicant \
with a name, telegram, discord, username and twitter handle. \
Return only matches you are highly confident about: the member name must clearly refer to \
the same person as the candidate (same name, nickname, or handle, allowing for spacing, \
punctuation, accents and capitalization). Never guess. Leave a member out when unsure. \
Use each twitter handle at most once. \
Respond with JSON only, in the form {\"matches\": [{\"member\": \"<member exactly as given>\", \
\"twitter\": \"<candidate twitter handle>\"}]}.";

#[derive(Debug, Deserialize)]
struct SuggestionEnvelope {
    matches: Vec<Value>,
}

/// A suggestion that passed re-validation but is not yet committed
#[derive(Debug, Clone)]
struct Validated {
    member: String,
    handle: String,
    score: f64,
}

/// Second pass that asks a [`CandidateGenerator`] about unresolved members.
pub struct ExternalResolver<G> {
    generator: G,
    config: ResolverConfig,
}

impl<G: CandidateGenerator> ExternalResolver<G> {
    pub fn new(generator: G) -> Self {
        Self::with_config(generator, ResolverConfig::default())
    }

    pub fn with_config(generator: G, config: ResolverConfig) -> Self {
        Self { generator, config }
    }

    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Build the request for one batch of unresolved members.
    ///
    /// Candidates are the first `max_candidates` eligible applicants.
    #[must_use]
    pub fn build_request(&self, engine: &ResolutionEngine, members: &[String]) -> ResolverRequest {
        let candidates = engine
            .applicants()
            .iter()
            .take(self.config.max_candidates)
            .map(|a| CandidateSummary {
                i: a.index,
                name: a.record.display_name().map(str::to_string),
                telegram: a.record.telegram.clone(),
                discord: a.record.discord.clone(),
                username: a.record.username.clone(),
                twitter: a.handle.clone(),
            })
            .collect();

        ResolverRequest {
            members: members.to_vec(),
            candidates,
            instructions: INSTRUCTIONS.to_string(),
        }
    }

    /// Try to extend a deterministic resolution with re-validated suggestions.
    ///
    /// Unresolved members are sent in batches of `max_members`. A failed
    /// request only loses that batch's suggestions; entries already in the
    /// assignment are never touched.
    ///
    /// # Errors
    ///
    /// Returns an error only if an invariant breaks while committing.
    pub async fn extend(
        &self,
        engine: &ResolutionEngine,
        mut resolution: Resolution,
    ) -> Result<Resolution, AssignmentError> {
        let unresolved: Vec<String> = resolution
            .unresolved()
            .into_iter()
            .filter(|m| !m.trim().is_empty())
            .collect();
        if unresolved.is_empty() || engine.applicants().is_empty() {
            return Ok(resolution);
        }

        let before = resolution.assignment.len();
        for batch in unresolved.chunks(self.config.max_members.max(1)) {
            let request = self.build_request(engine, batch);
            debug!(
                members = request.members.len(),
                candidates = request.candidates.len(),
                "requesting external suggestions"
            );

            let text = match self.generator.suggest(&request).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("External resolver failed, skipping batch: {e}");
                    continue;
                }
            };

            let suggestions = parse_response(&text);
            let rejected = self.apply(engine, batch, &suggestions, &mut resolution.assignment)?;
            for rejection in &rejected {
                rejection.log();
            }
            resolution.external_rejections.extend(rejected);
        }

        info!(
            added = resolution.assignment.len() - before,
            rejected = resolution.external_rejections.len(),
            "external pass complete"
        );
        Ok(resolution)
    }

    /// Validate and commit one batch of suggestions.
    ///
    /// # Errors
    ///
    /// Returns an error only if an invariant breaks while committing.
    pub fn apply(
        &self,
        engine: &ResolutionEngine,
        batch: &[String],
        suggestions: &[SuggestedMatch],
        assignment: &mut Assignment,
    ) -> Result<Vec<ExternalRejection>, AssignmentError> {
        match self.config.policy {
            ExternalPolicy::FirstMatch => {
                self.apply_first_match(engine, batch, suggestions, assignment)
            }
            ExternalPolicy::ScoreOrdered => {
                self.apply_score_ordered(engine, batch, suggestions, assignment)
            }
        }
    }

    fn apply_first_match(
        &self,
        engine: &ResolutionEngine,
        batch: &[String],
        suggestions: &[SuggestedMatch],
        assignment: &mut Assignment,
    ) -> Result<Vec<ExternalRejection>, AssignmentError> {
        let mut rejected = Vec::new();

        for suggestion in suggestions {
            let handle = clean_handle(&suggestion.twitter);
            let reject = |reason| ExternalRejection {
                member: suggestion.member.clone(),
                handle: handle.clone(),
                reason,
            };

            let Some(member) = find_member(batch, &suggestion.member) else {
                rejected.push(reject(ExternalRejectReason::UnknownMember));
                continue;
            };
            if assignment.contains_member(member) {
                rejected.push(reject(ExternalRejectReason::MemberAlreadyAssigned));
                continue;
            }
            if handle.is_empty() {
                rejected.push(reject(ExternalRejectReason::EmptyHandle));
                continue;
            }
            if assignment.is_handle_claimed(&handle) {
                rejected.push(reject(ExternalRejectReason::HandleAlreadyUsed));
                continue;
            }

            match self.revalidate(engine, member, &handle) {
                Ok(valid) => {
                    assignment.commit(
                        &valid.member,
                        &valid.handle,
                        valid.score,
                        MatchSource::ExternalAssisted,
                    )?;
                }
                Err(reason) => rejected.push(reject(reason)),
            }
        }

        Ok(rejected)
    }

    fn apply_score_ordered(
        &self,
        engine: &ResolutionEngine,
        batch: &[String],
        suggestions: &[SuggestedMatch],
        assignment: &mut Assignment,
    ) -> Result<Vec<ExternalRejection>, AssignmentError> {
        let mut rejected = Vec::new();
        let mut valid = Vec::new();

        for suggestion in suggestions {
            let handle = clean_handle(&suggestion.twitter);
            let reject = |reason| ExternalRejection {
                member: suggestion.member.clone(),
                handle: handle.clone(),
                reason,
            };

            let Some(member) = find_member(batch, &suggestion.member) else {
                rejected.push(reject(ExternalRejectReason::UnknownMember));
                continue;
            };
            if handle.is_empty() {
                rejected.push(reject(ExternalRejectReason::EmptyHandle));
                continue;
            }
            match self.revalidate(engine, member, &handle) {
                Ok(v) => valid.push(v),
                Err(reason) => rejected.push(reject(reason)),
            }
        }

        valid.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        for v in valid {
            let reason = match assignment.commit(
                &v.member,
                &v.handle,
                v.score,
                MatchSource::ExternalAssisted,
            )? {
                Commit::Committed => continue,
                Commit::MemberTaken => ExternalRejectReason::MemberAlreadyAssigned,
                Commit::HandleTaken(_) => ExternalRejectReason::HandleAlreadyUsed,
            };
            rejected.push(ExternalRejection {
                member: v.member,
                handle: v.handle,
                reason,
            });
        }

        Ok(rejected)
    }

    /// Re-score a suggestion with the deterministic scorer.
    fn revalidate(
        &self,
        engine: &ResolutionEngine,
        member: &str,
        handle: &str,
    ) -> Result<Validated, ExternalRejectReason> {
        let owner = engine
            .find_by_handle(handle)
            .ok_or(ExternalRejectReason::NoSuchApplicant)?;
        let score = engine.score(member, owner).score;
        if score < self.config.acceptance_threshold {
            return Err(ExternalRejectReason::LowScore { score });
        }
        Ok(Validated {
            member: member.to_string(),
            handle: owner.handle.clone(),
            score,
        })
    }
}

/// Map a member name echoed by the model back to the batch entry.
///
/// Exact matches win; otherwise a unique batch member with the same
/// normalized form is accepted.
fn find_member<'a>(batch: &'a [String], name: &str) -> Option<&'a str> {
    if let Some(exact) = batch.iter().find(|m| m.as_str() == name) {
        return Some(exact.as_str());
    }
    let key = normalize(name);
    if key.is_empty() {
        return None;
    }
    let mut same = batch.iter().filter(|m| normalize(m) == key);
    match (same.next(), same.next()) {
        (Some(only), None) => Some(only.as_str()),
        _ => None,
    }
}

/// Parse a provider response into suggestions.
///
/// Accepts `{"matches": [{"member": ..., "twitter": ...}]}`, optionally
/// wrapped in a Markdown code fence. Anything else yields no suggestions;
/// individual entries of the wrong shape are skipped.
#[must_use]
pub fn parse_response(text: &str) -> Vec<SuggestedMatch> {
    let body = strip_code_fence(text.trim());
    match serde_json::from_str::<SuggestionEnvelope>(body) {
        Ok(envelope) => envelope
            .matches
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        Err(e) => {
            debug!("Discarding malformed external response: {e}");
            Vec::new()
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
