use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::core::applicant::handle_key;
use crate::core::types::MatchSource;
use crate::matching::diagnosis::{RejectReason, Rejection, ScoreSnapshot};
use crate::matching::selector::MatchProposal;

/// A broken invariant reaching the assigner. Indicates a bug upstream.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("Proposal for member '{0}' has an empty handle")]
    EmptyHandle(String),

    #[error("Proposal for handle '{0}' has an empty member")]
    EmptyMember(String),
}

/// One committed member-to-handle link
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentEntry {
    pub member: String,
    /// Bare handle, no leading `@`
    pub handle: String,
    pub score: f64,
    pub source: MatchSource,
}

/// Result of trying to commit one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    Committed,
    MemberTaken,
    /// Handle already belongs to the named member
    HandleTaken(String),
}

/// Partial injective map from member to handle.
///
/// Entries are append-only: once committed, a member's handle never changes
/// and the handle cannot be claimed again (compared case-insensitively).
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    entries: Vec<AssignmentEntry>,
    by_member: HashMap<String, usize>,
    by_handle: HashMap<String, usize>,
}

impl Assignment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit `member -> handle` unless either side is already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the member or handle is empty.
    pub fn commit(
        &mut self,
        member: &str,
        handle: &str,
        score: f64,
        source: MatchSource,
    ) -> Result<Commit, AssignmentError> {
        if handle.is_empty() {
            return Err(AssignmentError::EmptyHandle(member.to_string()));
        }
        if member.is_empty() {
            return Err(AssignmentError::EmptyMember(handle.to_string()));
        }
        if self.by_member.contains_key(member) {
            return Ok(Commit::MemberTaken);
        }
        let key = handle_key(handle);
        if let Some(&owner) = self.by_handle.get(&key) {
            return Ok(Commit::HandleTaken(self.entries[owner].member.clone()));
        }

        let index = self.entries.len();
        self.entries.push(AssignmentEntry {
            member: member.to_string(),
            handle: handle.to_string(),
            score,
            source,
        });
        self.by_member.insert(member.to_string(), index);
        self.by_handle.insert(key, index);
        Ok(Commit::Committed)
    }

    /// Handle assigned to `member`, if any
    #[must_use]
    pub fn get(&self, member: &str) -> Option<&str> {
        self.by_member
            .get(member)
            .map(|&i| self.entries[i].handle.as_str())
    }

    #[must_use]
    pub fn entry(&self, member: &str) -> Option<&AssignmentEntry> {
        self.by_member.get(member).map(|&i| &self.entries[i])
    }

    #[must_use]
    pub fn contains_member(&self, member: &str) -> bool {
        self.by_member.contains_key(member)
    }

    #[must_use]
    pub fn is_handle_claimed(&self, handle: &str) -> bool {
        self.by_handle.contains_key(&handle_key(handle))
    }

    /// Entries in commit order
    #[must_use]
    pub fn entries(&self) -> &[AssignmentEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Greedily turn accepted proposals from all members into an injective assignment.
///
/// Proposals are committed in score order (ties by roster position). A
/// proposal whose member is already assigned or whose handle is already
/// claimed is skipped and reported as a rejection.
///
/// # Errors
///
/// Returns an error if a proposal carries an empty member or handle.
pub fn assign(
    mut proposals: Vec<MatchProposal>,
) -> Result<(Assignment, Vec<Rejection>), AssignmentError> {
    proposals.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.member_index.cmp(&b.member_index))
    });

    let mut assignment = Assignment::new();
    let mut rejections = Vec::new();

    for proposal in proposals {
        let outcome = assignment.commit(
            &proposal.member,
            &proposal.handle,
            proposal.score,
            MatchSource::Deterministic,
        )?;
        let reason = match outcome {
            Commit::Committed => continue,
            Commit::MemberTaken => RejectReason::DuplicateMember,
            Commit::HandleTaken(by) => RejectReason::HandleClaimed { by },
        };
        rejections.push(Rejection {
            member: proposal.member,
            reason,
            top: Some(ScoreSnapshot {
                handle: proposal.handle,
                score: proposal.score,
            }),
            runner_up: proposal.runner_up,
        });
    }

    Ok((assignment, rejections))
}
