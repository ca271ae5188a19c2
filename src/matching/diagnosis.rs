use serde::Serialize;

/// A handle and the score its applicant reached for some member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSnapshot {
    pub handle: String,
    pub score: f64,
}

/// Why the deterministic pass left a member unassigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RejectReason {
    /// Roster entry is blank
    EmptyName,
    /// No applicant exposes a usable handle
    NoCandidates,
    /// Best score is under the similarity threshold
    BelowThreshold,
    /// Best and second-best scores are too close to call
    AmbiguousMargin,
    /// Cleared the gate, but a higher-scoring member already took the handle
    HandleClaimed { by: String },
    /// The same display name appears earlier in the roster and was assigned
    DuplicateMember,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "empty member name"),
            Self::NoCandidates => write!(f, "no eligible applicants"),
            Self::BelowThreshold => write!(f, "below similarity threshold"),
            Self::AmbiguousMargin => write!(f, "ambiguous: top two scores too close"),
            Self::HandleClaimed { by } => write!(f, "handle already claimed by {by}"),
            Self::DuplicateMember => write!(f, "duplicate roster entry"),
        }
    }
}

/// Audit record for a member the deterministic pass did not assign
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub member: String,
    pub reason: RejectReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<ScoreSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runner_up: Option<ScoreSnapshot>,
}

impl Rejection {
    /// Emit this rejection to the log sink
    pub fn log(&self) {
        tracing::info!(
            member = %self.member,
            reason = %self.reason,
            top = ?self.top.as_ref().map(|s| s.score),
            top_handle = ?self.top.as_ref().map(|s| s.handle.as_str()),
            runner_up = ?self.runner_up.as_ref().map(|s| s.score),
            "member left unassigned"
        );
    }
}

/// Why a suggestion from the external resolver was not accepted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ExternalRejectReason {
    /// Member was not part of the submitted batch
    UnknownMember,
    /// Member was already granted a handle, earlier in this batch or before
    MemberAlreadyAssigned,
    /// Suggested handle was empty after cleaning
    EmptyHandle,
    /// Handle is already used by another assignment
    HandleAlreadyUsed,
    /// No applicant owns the suggested handle
    NoSuchApplicant,
    /// Re-validated score is under the acceptance threshold
    LowScore { score: f64 },
}

impl std::fmt::Display for ExternalRejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownMember => write!(f, "member not in batch"),
            Self::MemberAlreadyAssigned => write!(f, "member already assigned"),
            Self::EmptyHandle => write!(f, "empty handle"),
            Self::HandleAlreadyUsed => write!(f, "handle already used"),
            Self::NoSuchApplicant => write!(f, "no applicant owns handle"),
            Self::LowScore { score } => write!(f, "re-validated score {score:.3} too low"),
        }
    }
}

/// Audit record for a rejected external suggestion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalRejection {
    pub member: String,
    pub handle: String,
    pub reason: ExternalRejectReason,
}

impl ExternalRejection {
    pub fn log(&self) {
        tracing::debug!(
            member = %self.member,
            handle = %self.handle,
            reason = %self.reason,
            "external suggestion rejected"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_reason_serializes_with_kind_tag() {
        let json = serde_json::to_value(RejectReason::HandleClaimed {
            by: "Dan".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "handle_claimed");
        assert_eq!(json["by"], "Dan");

        let json = serde_json::to_value(ExternalRejectReason::LowScore { score: 0.5 }).unwrap();
        assert_eq!(json["kind"], "low_score");
    }

    #[test]
    fn test_rejection_skips_missing_scores() {
        let rejection = Rejection {
            member: "ghost".to_string(),
            reason: RejectReason::NoCandidates,
            top: None,
            runner_up: None,
        };
        let json = serde_json::to_value(&rejection).unwrap();
        assert!(json.get("top").is_none());
        assert_eq!(json["reason"]["kind"], "no_candidates");
    }
}
