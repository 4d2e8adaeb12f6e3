//! Domain types - branches, tags and versions independent of git access

pub mod branch;
pub mod branch_commit;
pub mod tag;
pub mod version;

pub use branch::{Branch, BranchKey};
pub use branch_commit::{BranchCommit, MergeBaseResult};
pub use tag::{Tag, TagRef};
pub use version::{SemanticVersion, TagPrefix};
