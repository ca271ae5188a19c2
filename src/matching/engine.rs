use std::collections::HashSet;

use crate::core::applicant::{handle_key, ApplicantRecord};
use crate::matching::assignment::{assign, Assignment, AssignmentError};
use crate::matching::diagnosis::{ExternalRejection, Rejection};
use crate::matching::features::{ApplicantFeatures, MemberFeatures};
use crate::matching::scoring::PairScore;
use crate::matching::selector::{rank_candidates, select, ScoredCandidate, Selection, SelectorConfig};

/// Outcome of one resolution run
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Roster in input order
    pub members: Vec<String>,

    pub assignment: Assignment,

    /// Members the deterministic pass left unassigned, and why
    pub rejections: Vec<Rejection>,

    /// External suggestions that failed re-validation
    pub external_rejections: Vec<ExternalRejection>,
}

impl Resolution {
    /// Members without an assignment, in roster order, without repeats
    #[must_use]
    pub fn unresolved(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.members
            .iter()
            .filter(|m| !self.assignment.contains_member(m))
            .filter(|m| seen.insert(m.as_str()))
            .cloned()
            .collect()
    }
}

/// The deterministic identity-resolution pipeline.
///
/// Applicant features are built once at construction; every member is then
/// scored against the same read-only feature list.
pub struct ResolutionEngine {
    applicants: Vec<ApplicantFeatures>,
    config: SelectorConfig,
}

impl ResolutionEngine {
    /// Create an engine with the default operating point
    #[must_use]
    pub fn new(applicants: &[ApplicantRecord]) -> Self {
        Self::with_config(applicants, SelectorConfig::default())
    }

    #[must_use]
    pub fn with_config(applicants: &[ApplicantRecord], config: SelectorConfig) -> Self {
        let applicants: Vec<ApplicantFeatures> = applicants
            .iter()
            .enumerate()
            .filter_map(|(i, record)| ApplicantFeatures::build(i, record))
            .collect();
        tracing::debug!(eligible = applicants.len(), "built applicant features");
        Self { applicants, config }
    }

    /// Applicants that expose a usable handle
    #[must_use]
    pub fn applicants(&self) -> &[ApplicantFeatures] {
        &self.applicants
    }

    #[must_use]
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// First eligible applicant owning `handle` (case-insensitive)
    #[must_use]
    pub fn find_by_handle(&self, handle: &str) -> Option<&ApplicantFeatures> {
        let key = handle_key(handle);
        self.applicants.iter().find(|a| a.handle_key == key)
    }

    /// Every eligible applicant scored against `member`, best first
    #[must_use]
    pub fn rank(&self, member: &str) -> Vec<ScoredCandidate> {
        rank_candidates(&MemberFeatures::build(member), &self.applicants)
    }

    /// Score `member` against one eligible applicant
    #[must_use]
    pub fn score(&self, member: &str, applicant: &ApplicantFeatures) -> PairScore {
        PairScore::calculate(&MemberFeatures::build(member), applicant)
    }

    /// Run the deterministic pass over a roster.
    ///
    /// # Errors
    ///
    /// Returns an error only if an invariant breaks between the selector and
    /// the assigner (an empty member or handle in a proposal).
    pub fn resolve(&self, members: &[String]) -> Result<Resolution, AssignmentError> {
        let mut proposals = Vec::new();
        let mut rejections = Vec::new();

        for (index, member) in members.iter().enumerate() {
            let ranked = self.rank(member);
            match select(member, index, &ranked, &self.config) {
                Selection::Accepted(proposal) => proposals.push(proposal),
                Selection::Rejected(rejection) => rejections.push(rejection),
            }
        }

        let (assignment, conflicts) = assign(proposals)?;
        rejections.extend(conflicts);

        for rejection in &rejections {
            rejection.log();
        }
        tracing::info!(
            members = members.len(),
            assigned = assignment.len(),
            rejected = rejections.len(),
            "deterministic pass complete"
        );

        Ok(Resolution {
            members: members.to_vec(),
            assignment,
            rejections,
            external_rejections: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::diagnosis::RejectReason;

    fn record(full_name: &str, twitter: &str) -> ApplicantRecord {
        ApplicantRecord {
            full_name: Some(full_name.to_string()),
            twitter: Some(twitter.to_string()),
            ..Default::default()
        }
    }

    fn roster(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_resolve_exact_match() {
        let applicants = vec![
            record("Juan Perez", "@juanperez"),
            record("Margaret Hamilton", "https://x.com/mhamilton"),
        ];
        let engine = ResolutionEngine::new(&applicants);
        let resolution = engine.resolve(&roster(&["Juan Pérez"])).unwrap();
        assert_eq!(resolution.assignment.get("Juan Pérez"), Some("juanperez"));
        assert!(resolution.rejections.is_empty());
        assert!(resolution.unresolved().is_empty());
    }

    #[test]
    fn test_ineligible_applicants_are_skipped() {
        let applicants = vec![ApplicantRecord {
            full_name: Some("Juan Perez".to_string()),
            ..Default::default()
        }];
        let engine = ResolutionEngine::new(&applicants);
        assert!(engine.applicants().is_empty());

        let resolution = engine.resolve(&roster(&["Juan Perez"])).unwrap();
        assert!(resolution.assignment.is_empty());
        assert_eq!(resolution.rejections[0].reason, RejectReason::NoCandidates);
    }

    #[test]
    fn test_unresolved_keeps_roster_order_without_repeats() {
        let engine = ResolutionEngine::new(&[record("Juan Perez", "juanperez")]);
        let resolution = engine
            .resolve(&roster(&["zed", "Juan Perez", "amy", "zed"]))
            .unwrap();
        assert_eq!(resolution.unresolved(), vec!["zed", "amy"]);
    }

    #[test]
    fn test_blank_member_does_not_discard_assignment() {
        let applicants = vec![
            ApplicantRecord {
                twitter: Some("a".to_string()),
                ..Default::default()
            },
            record("Juan Perez", "juanperez"),
        ];
        let engine = ResolutionEngine::new(&applicants);
        let resolution = engine.resolve(&roster(&["Juan Perez", ""])).unwrap();
        assert_eq!(resolution.assignment.get("Juan Perez"), Some("juanperez"));
        assert_eq!(resolution.assignment.get(""), None);
        assert_eq!(resolution.rejections.len(), 1);
        assert_eq!(resolution.rejections[0].member, "");
        assert_eq!(resolution.rejections[0].reason, RejectReason::EmptyName);
    }

    #[test]
    fn test_duplicate_records_make_member_ambiguous() {
        let applicants = vec![
            record("Juan Perez", "juanperez"),
            record("Juan Perez", "juanperez"),
        ];
        let engine = ResolutionEngine::new(&applicants);
        let resolution = engine.resolve(&roster(&["Juan Perez"])).unwrap();
        assert!(resolution.assignment.is_empty());

        let rejection = &resolution.rejections[0];
        assert_eq!(rejection.reason, RejectReason::AmbiguousMargin);
        let top = rejection.top.as_ref().unwrap();
        let runner_up = rejection.runner_up.as_ref().unwrap();
        assert!((top.score - runner_up.score).abs() < 1e-9);
    }

    #[test]
    fn test_find_by_handle_is_case_insensitive() {
        let engine = ResolutionEngine::new(&[record("Juan Perez", "@JuanPerez")]);
        assert!(engine.find_by_handle("juanperez").is_some());
        assert!(engine.find_by_handle("nobody").is_none());
    }
}
