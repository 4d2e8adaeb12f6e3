use crate::domain::{Branch, TagRef};
use crate::error::{LineageError, Result};
use crate::git::{CommitInfo, Repository};
use git2::Oid;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory commit graph for testing without a real repository
///
/// Commits are created oldest first; ids are derived from a counter so
/// they are stable across runs. Calls to the traversal primitives are
/// counted so tests can assert that cached or short-circuited paths do no
/// graph work.
pub struct MockRepository {
    commits: HashMap<Oid, CommitInfo>,
    sequence: HashMap<Oid, usize>,
    branches: Vec<Branch>,
    tags: Vec<TagRef>,
    merge_base_calls: AtomicUsize,
    reachability_calls: AtomicUsize,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            commits: HashMap::new(),
            sequence: HashMap::new(),
            branches: Vec::new(),
            tags: Vec::new(),
            merge_base_calls: AtomicUsize::new(0),
            reachability_calls: AtomicUsize::new(0),
        }
    }

    /// Add a commit with the given parents (first parent first)
    ///
    /// Panics if a parent is unknown, which keeps the graph acyclic.
    pub fn commit(&mut self, parents: &[Oid], when: i64) -> Oid {
        for parent in parents {
            assert!(self.commits.contains_key(parent), "unknown parent {}", parent);
        }

        let index = self.commits.len();
        let mut bytes = [0u8; 20];
        bytes[12..20].copy_from_slice(&(index as u64 + 1).to_be_bytes());
        let id = Oid::from_bytes(&bytes).expect("20 byte oid");

        self.commits.insert(
            id,
            CommitInfo {
                id,
                parents: parents.to_vec(),
                when,
            },
        );
        self.sequence.insert(id, index);
        id
    }

    /// Add or move a local branch, returning the branch as enumerated
    pub fn set_branch(&mut self, name: &str, tip: Option<Oid>) -> Branch {
        self.put_branch(Branch::local(name, tip))
    }

    /// Add or move a remote-tracking branch
    pub fn set_remote_branch(&mut self, remote: &str, name: &str, tip: Option<Oid>) -> Branch {
        self.put_branch(Branch::remote(remote, name, tip))
    }

    /// Add or replace a branch as given
    pub fn put_branch(&mut self, branch: Branch) -> Branch {
        match self.branches.iter_mut().find(|b| b.is_same_ref(&branch)) {
            Some(existing) => *existing = branch.clone(),
            None => self.branches.push(branch.clone()),
        }
        branch
    }

    /// Add a tag; `None` models a tag that peels to a tree or blob
    pub fn add_tag(&mut self, name: impl Into<String>, target: Option<Oid>) {
        self.tags.push(TagRef::new(name, target));
    }

    pub fn merge_base_calls(&self) -> usize {
        self.merge_base_calls.load(Ordering::SeqCst)
    }

    pub fn reachability_calls(&self) -> usize {
        self.reachability_calls.load(Ordering::SeqCst)
    }

    fn get(&self, oid: Oid) -> Result<&CommitInfo> {
        self.commits
            .get(&oid)
            .ok_or_else(|| LineageError::invalid_argument(format!("Unknown commit: {}", oid)))
    }

    fn ancestors(&self, tip: Oid) -> Result<HashSet<Oid>> {
        let mut seen = HashSet::new();
        let mut stack = vec![tip];

        while let Some(oid) = stack.pop() {
            if seen.insert(oid) {
                stack.extend(self.get(oid)?.parents.iter().copied());
            }
        }

        Ok(seen)
    }

    /// Newest first by commit time, later-created first on ties
    fn sorted(&self, oids: impl IntoIterator<Item = Oid>) -> Vec<Oid> {
        let mut oids: Vec<Oid> = oids.into_iter().collect();
        oids.sort_by_key(|oid| {
            let when = self.commits.get(oid).map_or(i64::MIN, |c| c.when);
            let seq = self.sequence.get(oid).copied().unwrap_or(0);
            std::cmp::Reverse((when, seq))
        });
        oids
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn branches(&self) -> Result<Vec<Branch>> {
        Ok(self.branches.clone())
    }

    fn tags(&self) -> Result<Vec<TagRef>> {
        Ok(self.tags.clone())
    }

    fn find_commit(&self, oid: Oid) -> Result<CommitInfo> {
        self.get(oid).cloned()
    }

    fn merge_base(&self, one: Oid, two: Oid) -> Result<Option<Oid>> {
        self.merge_base_calls.fetch_add(1, Ordering::SeqCst);

        let from_one = self.ancestors(one)?;
        let from_two = self.ancestors(two)?;
        let common: HashSet<Oid> = from_one.intersection(&from_two).copied().collect();

        // Best common ancestors: those not reachable from another common one
        let mut shadowed = HashSet::new();
        for oid in &common {
            for parent in &self.get(*oid)?.parents {
                shadowed.extend(self.ancestors(*parent)?);
            }
        }

        let best = common.into_iter().filter(|oid| !shadowed.contains(oid));
        Ok(self.sorted(best).first().copied())
    }

    fn history(&self, tip: Oid) -> Result<Vec<Oid>> {
        Ok(self.sorted(self.ancestors(tip)?))
    }

    fn commits_between(&self, include: Oid, exclude: Oid) -> Result<Vec<CommitInfo>> {
        let hidden = self.ancestors(exclude)?;
        let visible = self
            .ancestors(include)?
            .into_iter()
            .filter(|oid| !hidden.contains(oid));

        self.sorted(visible)
            .into_iter()
            .map(|oid| self.find_commit(oid))
            .collect()
    }

    fn is_reachable_from(&self, commit: Oid, tip: Oid) -> Result<bool> {
        self.reachability_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.ancestors(tip)?.contains(&commit))
    }
}
