use super::{Branch, BranchKey};
use git2::Oid;
use std::fmt;

/// A commit paired with the branch it was found on
///
/// The empty value stands for "no relationship found".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BranchCommit {
    pub commit: Option<Oid>,
    pub branch: Option<Branch>,
}

impl BranchCommit {
    pub fn new(commit: Oid, branch: Branch) -> Self {
        BranchCommit {
            commit: Some(commit),
            branch: Some(branch),
        }
    }

    pub fn empty() -> Self {
        BranchCommit::default()
    }

    pub fn is_empty(&self) -> bool {
        self.commit.is_none() && self.branch.is_none()
    }
}

impl fmt::Display for BranchCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.branch, self.commit) {
            (Some(branch), Some(commit)) => write!(f, "{} @ {}", branch, commit),
            (Some(branch), None) => write!(f, "{}", branch),
            _ => write!(f, "(none)"),
        }
    }
}

/// Outcome of a merge base lookup for an ordered branch pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeBaseResult {
    pub first: BranchKey,
    pub second: BranchKey,
    pub merge_base: Option<Oid>,
}
