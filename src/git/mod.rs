//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git graph
//! primitives that branch lineage analysis is built from, allowing for
//! multiple implementations including real repositories and an in-memory
//! commit graph for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory commit graph with call counters
//!
//! # Usage
//!
//! Analysis code depends on the [Repository] trait rather than concrete
//! implementations.
//!
//! ```rust
//! # use git_lineage::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> git_lineage::Result<()> {
//! for branch in repo.branches()? {
//!     if let Some(tip) = branch.tip {
//!         let history = repo.history(tip)?;
//!         println!("{}: {} commits", branch, history.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::domain::{Branch, TagRef};
use crate::error::Result;
use git2::Oid;

/// Commit information needed for graph analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: Oid,
    /// Parent ids, first parent first
    pub parents: Vec<Oid>,
    /// Committer time in seconds since the epoch
    pub when: i64,
}

impl CommitInfo {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// Git graph primitives consumed by lineage analysis
///
/// Implementations are read-only views over one repository snapshot.
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying errors (like `git2::Error`) to [crate::error::LineageError].
/// "Not found" style outcomes that are part of normal analysis (no common
/// ancestor) are `Ok(None)`, not errors.
pub trait Repository {
    /// Enumerate all local and remote branches
    fn branches(&self) -> Result<Vec<Branch>>;

    /// Enumerate all tags, each peeled to the commit it refers to
    ///
    /// Tags that do not resolve to a commit are returned with no target.
    fn tags(&self) -> Result<Vec<TagRef>>;

    /// Look up a commit's parents and committer time
    fn find_commit(&self, oid: Oid) -> Result<CommitInfo>;

    /// Best common ancestor of two commits
    ///
    /// # Returns
    /// * `Ok(Some(Oid))` - The merge base
    /// * `Ok(None)` - The histories share no commit
    fn merge_base(&self, one: Oid, two: Oid) -> Result<Option<Oid>>;

    /// `tip` and all of its ancestors, newest first
    fn history(&self, tip: Oid) -> Result<Vec<Oid>>;

    /// Commits reachable from `include` but not from `exclude`, newest first
    ///
    /// # Example
    /// ```rust
    /// # use git_lineage::git::Repository;
    /// # use git2::Oid;
    /// # fn example<R: Repository>(repo: &R, tip: Oid, base: Oid) -> git_lineage::Result<()> {
    /// let merges = repo
    ///     .commits_between(tip, base)?
    ///     .into_iter()
    ///     .filter(|c| c.is_merge())
    ///     .count();
    /// println!("{} merges since {}", merges, base);
    /// # Ok(())
    /// # }
    /// ```
    fn commits_between(&self, include: Oid, exclude: Oid) -> Result<Vec<CommitInfo>>;

    /// Whether `commit` is `tip` or one of its ancestors
    fn is_reachable_from(&self, commit: Oid, tip: Oid) -> Result<bool>;
}
