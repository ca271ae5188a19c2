//! End-to-end tests of the resolution pipeline through the public API.

use async_trait::async_trait;
use handle_resolver::external::{ExternalError, ResolverRequest};
use handle_resolver::matching::diagnosis::{ExternalRejectReason, RejectReason};
use handle_resolver::matching::normalize::normalize;
use handle_resolver::{
    score, ApplicantRecord, CandidateGenerator, ExternalResolver, MatchSource, ResolutionEngine,
};

fn roster(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

fn applicants() -> Vec<ApplicantRecord> {
    serde_json::from_str(
        r#"[
            {"fullName": "Juan Perez", "twitter": "@juanperez", "status": "approved"},
            {"walletAddress": "0xAlice123", "twitter": "alice_eth"},
            {"username": "cryptodan1", "twitter": "dan_one"},
            {"username": "cryptodan2", "twitter": "dan_two"},
            {"fullName": "Dan", "twitter": "https://twitter.com/danthedev"},
            {"fullName": "Grace Hopper", "discord": "grace#0001"},
            {"name": 12345, "x": "@numbers"}
        ]"#,
    )
    .unwrap()
}

/// Returns a fixed response body for every request
struct Scripted(&'static str);

#[async_trait]
impl CandidateGenerator for Scripted {
    async fn suggest(&self, _request: &ResolverRequest) -> Result<String, ExternalError> {
        Ok(self.0.to_string())
    }
}

#[test]
fn test_diacritics_resolve_to_exact_match() {
    let engine = ResolutionEngine::new(&applicants());
    let resolution = engine.resolve(&roster(&["Juan Pérez"])).unwrap();
    let entry = resolution.assignment.entry("Juan Pérez").unwrap();
    assert_eq!(entry.handle, "juanperez");
    assert!((entry.score - 1.0).abs() < 1e-9);
    assert_eq!(entry.source, MatchSource::Deterministic);
}

#[test]
fn test_wallet_prefix_scores_in_substring_tier() {
    let record = &applicants()[1];
    let s = score("0xAlice", record).unwrap();
    assert!(s.includes);
    assert!(s.score >= 0.97);
}

#[test]
fn test_ambiguous_member_is_rejected_with_both_scores() {
    let engine = ResolutionEngine::new(&applicants());
    let resolution = engine.resolve(&roster(&["cryptoDan"])).unwrap();
    assert!(resolution.assignment.get("cryptoDan").is_none());

    let rejection = &resolution.rejections[0];
    assert_eq!(rejection.reason, RejectReason::AmbiguousMargin);
    let top = rejection.top.as_ref().unwrap();
    let runner_up = rejection.runner_up.as_ref().unwrap();
    assert!(top.score >= 0.8);
    assert!(top.score - runner_up.score < 0.06);
}

#[test]
fn test_contested_handle_goes_to_higher_score() {
    let records = vec![ApplicantRecord {
        full_name: Some("Dan".to_string()),
        twitter: Some("https://twitter.com/danthedev".to_string()),
        ..Default::default()
    }];
    let engine = ResolutionEngine::new(&records);
    let resolution = engine.resolve(&roster(&["Daniel", "Dan"])).unwrap();
    assert_eq!(resolution.assignment.get("Dan"), Some("danthedev"));
    assert_eq!(resolution.assignment.get("Daniel"), None);
    assert!(resolution.rejections.iter().any(|r| r.member == "Daniel"
        && r.reason
            == RejectReason::HandleClaimed {
                by: "Dan".to_string()
            }));
    assert_eq!(resolution.unresolved(), vec!["Daniel"]);
}

#[test]
fn test_applicants_without_handle_never_match() {
    let engine = ResolutionEngine::new(&applicants());
    let resolution = engine.resolve(&roster(&["Grace Hopper"])).unwrap();
    assert!(resolution.assignment.is_empty());
    assert!(engine.find_by_handle("grace").is_none());
}

#[test]
fn test_deterministic_pass_is_repeatable_and_injective() {
    let members = roster(&[
        "Juan Pérez",
        "0xAlice",
        "cryptoDan",
        "Dan",
        "Daniel",
        "12345",
        "nobody at all",
        "Dan",
    ]);
    let engine = ResolutionEngine::new(&applicants());
    let first = engine.resolve(&members).unwrap();
    let second = engine.resolve(&members).unwrap();
    assert_eq!(first.assignment.entries(), second.assignment.entries());

    let entries = first.assignment.entries();
    let mut handles: Vec<String> = entries.iter().map(|e| e.handle.to_lowercase()).collect();
    let mut names: Vec<&str> = entries.iter().map(|e| e.member.as_str()).collect();
    handles.sort();
    handles.dedup();
    names.sort_unstable();
    names.dedup();
    assert_eq!(handles.len(), entries.len());
    assert_eq!(names.len(), entries.len());
    assert_eq!(first.assignment.get("12345"), Some("numbers"));
}

#[test]
fn test_scores_stay_in_unit_interval() {
    let records = applicants();
    for member in ["Juan Pérez", "", "x", "0xAlice", "Dan the Dev", "李小龍"] {
        for record in &records {
            if let Some(s) = score(member, record) {
                assert!((0.0..=1.0).contains(&s.score), "{member}: {}", s.score);
                if s.exact {
                    assert!(s.score >= 0.97);
                }
            }
        }
    }
    assert_eq!(normalize(&normalize("Ünïcödé Nâmé")), normalize("Ünïcödé Nâmé"));
}

#[tokio::test]
async fn test_external_hallucination_is_rejected() {
    let engine = ResolutionEngine::new(&applicants());
    let resolution = engine.resolve(&roster(&["ghost99"])).unwrap();
    let resolver = ExternalResolver::new(Scripted(
        r#"{"matches": [{"member": "ghost99", "twitter": "realghost"}]}"#,
    ));
    let extended = resolver.extend(&engine, resolution).await.unwrap();
    assert!(extended.assignment.get("ghost99").is_none());
    assert_eq!(
        extended.external_rejections[0].reason,
        ExternalRejectReason::NoSuchApplicant
    );
}

#[tokio::test]
async fn test_external_suggestion_accepted_after_revalidation() {
    let engine = ResolutionEngine::new(&applicants());
    let resolution = engine.resolve(&roster(&["Juan Pérez", "cryptoDan"])).unwrap();
    assert_eq!(resolution.unresolved(), vec!["cryptoDan"]);

    let resolver = ExternalResolver::new(Scripted(
        r#"{"matches": [
            {"member": "cryptoDan", "twitter": "@dan_one"},
            {"member": "Juan Pérez", "twitter": "dan_two"}
        ]}"#,
    ));
    let extended = resolver.extend(&engine, resolution).await.unwrap();

    let entry = extended.assignment.entry("cryptoDan").unwrap();
    assert_eq!(entry.handle, "dan_one");
    assert_eq!(entry.source, MatchSource::ExternalAssisted);
    assert_eq!(extended.assignment.get("Juan Pérez"), Some("juanperez"));
    assert_eq!(
        extended.external_rejections[0].reason,
        ExternalRejectReason::UnknownMember
    );
}

#[tokio::test]
async fn test_malformed_external_response_adds_nothing() {
    let engine = ResolutionEngine::new(&applicants());
    let resolution = engine.resolve(&roster(&["Juan Pérez", "ghost99"])).unwrap();
    let before = resolution.assignment.entries().to_vec();

    let resolver = ExternalResolver::new(Scripted("I think ghost99 is @juanperez"));
    let extended = resolver.extend(&engine, resolution).await.unwrap();
    assert_eq!(extended.assignment.entries(), before.as_slice());
    assert!(extended.external_rejections.is_empty());
}
