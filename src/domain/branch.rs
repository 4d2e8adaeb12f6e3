use git2::Oid;
use std::fmt;

/// A git branch as seen at the start of an analysis run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Full reference name (e.g. "refs/heads/main", "refs/remotes/origin/main")
    pub canonical_name: String,
    /// Short display name (e.g. "main", "origin/main")
    pub friendly_name: String,
    /// Commit the branch points to, if it resolves to one
    pub tip: Option<Oid>,
    /// Local branch with a configured upstream
    pub is_tracking: bool,
    pub is_remote: bool,
}

impl Branch {
    /// Create a local, untracked branch from its short name
    pub fn local(name: impl Into<String>, tip: Option<Oid>) -> Self {
        let friendly_name = name.into();
        Branch {
            canonical_name: format!("refs/heads/{}", friendly_name),
            friendly_name,
            tip,
            is_tracking: false,
            is_remote: false,
        }
    }

    /// Create a remote-tracking branch, e.g. `remote("origin", "main", ..)`
    pub fn remote(remote: &str, name: &str, tip: Option<Oid>) -> Self {
        Branch {
            canonical_name: format!("refs/remotes/{}/{}", remote, name),
            friendly_name: format!("{}/{}", remote, name),
            tip,
            is_tracking: false,
            is_remote: true,
        }
    }

    /// Mark the branch as tracking an upstream
    pub fn tracking(mut self) -> Self {
        self.is_tracking = true;
        self
    }

    /// Friendly name with the remote segment stripped ("origin/main" -> "main")
    pub fn name_without_remote(&self) -> &str {
        if self.is_remote {
            self.friendly_name
                .split_once('/')
                .map(|(_, rest)| rest)
                .unwrap_or(self.friendly_name.as_str())
        } else {
            &self.friendly_name
        }
    }

    /// Snapshot identity used to key per-session caches
    pub fn key(&self) -> BranchKey {
        BranchKey {
            canonical_name: self.canonical_name.clone(),
            tip: self.tip,
        }
    }

    /// Same reference, regardless of where it currently points
    pub fn is_same_ref(&self, other: &Branch) -> bool {
        self.canonical_name == other.canonical_name
    }

    /// Same reference, or a local branch and a remote copy of it
    /// ("feature/x" and "origin/feature/x")
    pub fn is_same_branch(&self, other: &Branch) -> bool {
        self.is_same_ref(other) || self.name_without_remote() == other.name_without_remote()
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.friendly_name)
    }
}

/// Branch identity for caching: a name is only "the same branch" while its
/// tip is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchKey {
    pub canonical_name: String,
    pub tip: Option<Oid>,
}
