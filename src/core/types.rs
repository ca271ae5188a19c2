use serde::{Deserialize, Serialize};

/// How an assignment entry was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Accepted by the threshold + margin gate and the greedy assigner
    Deterministic,
    /// Suggested by the external language model and re-validated by the scorer
    ExternalAssisted,
}

impl std::fmt::Display for MatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deterministic => write!(f, "deterministic"),
            Self::ExternalAssisted => write!(f, "external"),
        }
    }
}

/// Confidence level for a pair score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
    Exact,
}

impl Confidence {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 1.0 {
            Self::Exact
        } else if score >= 0.96 {
            Self::High
        } else if score >= 0.80 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_buckets() {
        assert_eq!(Confidence::from_score(1.0), Confidence::Exact);
        assert_eq!(Confidence::from_score(0.97), Confidence::High);
        assert_eq!(Confidence::from_score(0.85), Confidence::Medium);
        assert_eq!(Confidence::from_score(0.2), Confidence::Low);
        assert!(Confidence::High > Confidence::Medium);
    }
}
