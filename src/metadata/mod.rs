//! Branch relationship metadata over one repository snapshot
//!
//! [RepositoryMetadata] is the analysis session: it borrows a [Repository]
//! and memoizes the expensive answers (version tags per branch, merge bases
//! per ordered branch pair, source-branch candidates per branch) for as long
//! as it lives. Build a new session whenever the repository may have changed.
//!
//! ```rust
//! # use git_lineage::git::Repository;
//! # use git_lineage::metadata::RepositoryMetadata;
//! # fn example<R: Repository>(repo: &R) -> git_lineage::Result<()> {
//! let mut metadata = RepositoryMetadata::new(repo);
//! let branches = repo.branches()?;
//! if let [first, second, ..] = branches.as_slice() {
//!     let base = metadata.find_merge_base(first, second)?;
//!     println!("{} and {} diverge at {:?}", first, second, base);
//! }
//! # Ok(())
//! # }
//! ```

mod branch_source;
mod containment;
mod merge_base;
mod tags;

pub use containment::BranchesContaining;

use crate::domain::{BranchCommit, BranchKey, MergeBaseResult, SemanticVersion};
use crate::git::Repository;
use std::collections::HashMap;

/// Per-analysis session holding the caches
///
/// Not meant to be shared between threads; each run owns its own session.
pub struct RepositoryMetadata<'r, R: Repository> {
    repo: &'r R,
    version_tags: HashMap<BranchKey, Vec<SemanticVersion>>,
    merge_bases: HashMap<(BranchKey, BranchKey), MergeBaseResult>,
    source_candidates: HashMap<BranchKey, Vec<BranchCommit>>,
}

impl<'r, R: Repository> RepositoryMetadata<'r, R> {
    /// Start a fresh session with empty caches
    pub fn new(repo: &'r R) -> Self {
        RepositoryMetadata {
            repo,
            version_tags: HashMap::new(),
            merge_bases: HashMap::new(),
            source_candidates: HashMap::new(),
        }
    }

    /// Merge bases resolved so far in this session
    pub fn cached_merge_bases(&self) -> impl Iterator<Item = &MergeBaseResult> {
        self.merge_bases.values()
    }
}
