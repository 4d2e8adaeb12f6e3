use super::RepositoryMetadata;
use crate::domain::Branch;
use crate::error::{LineageError, Result};
use crate::git::Repository;
use git2::Oid;
use std::iter::FusedIterator;
use tracing::debug;

enum Phase {
    DirectTip,
    Ancestry,
    Done,
}

/// Lazy search for the branches containing a commit
///
/// Branches whose tip is the commit are yielded first. Only when there are
/// none does the search fall back to a reachability check per branch, one
/// branch per call to `next`. Not restartable: iterating again means
/// starting a new search.
pub struct BranchesContaining<'a, R: Repository> {
    repo: &'a R,
    commit: Oid,
    candidates: &'a [Branch],
    only_tracked: bool,
    phase: Phase,
    index: usize,
    found_direct: bool,
}

impl<'a, R: Repository> BranchesContaining<'a, R> {
    fn selected(&self, branch: &Branch) -> bool {
        !self.only_tracked || branch.is_tracking
    }

    fn next_candidate(&mut self) -> Option<&'a Branch> {
        let candidates = self.candidates;
        while let Some(branch) = candidates.get(self.index) {
            self.index += 1;
            if self.selected(branch) {
                return Some(branch);
            }
        }
        None
    }
}

impl<'a, R: Repository> Iterator for BranchesContaining<'a, R> {
    type Item = Result<&'a Branch>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.phase {
                Phase::DirectTip => {
                    while let Some(branch) = self.next_candidate() {
                        if branch.tip == Some(self.commit) {
                            self.found_direct = true;
                            return Some(Ok(branch));
                        }
                    }

                    self.index = 0;
                    self.phase = if self.found_direct {
                        Phase::Done
                    } else {
                        debug!(
                            "No branch tip is {}; searching branch histories",
                            self.commit
                        );
                        Phase::Ancestry
                    };
                }
                Phase::Ancestry => {
                    while let Some(branch) = self.next_candidate() {
                        let Some(tip) = branch.tip else {
                            continue;
                        };

                        match self.repo.is_reachable_from(self.commit, tip) {
                            Ok(true) => return Some(Ok(branch)),
                            Ok(false) => {}
                            Err(e) => {
                                self.phase = Phase::Done;
                                return Some(Err(e));
                            }
                        }
                    }

                    self.phase = Phase::Done;
                }
                Phase::Done => return None,
            }
        }
    }
}

impl<'a, R: Repository> FusedIterator for BranchesContaining<'a, R> {}

impl<'r, R: Repository> RepositoryMetadata<'r, R> {
    /// Branches among `candidates` that contain `commit`
    ///
    /// With `only_tracked` set, branches without an upstream are ignored.
    /// Results are not cached; collect them if they are needed twice.
    ///
    /// # Returns
    /// * `Err(InvalidArgument)` - If `commit` is absent
    pub fn branches_containing_commit<'a>(
        &self,
        commit: Option<Oid>,
        candidates: &'a [Branch],
        only_tracked: bool,
    ) -> Result<BranchesContaining<'a, R>>
    where
        'r: 'a,
    {
        let commit = commit.ok_or_else(|| {
            LineageError::invalid_argument("Cannot search branches for an absent commit")
        })?;

        Ok(BranchesContaining {
            repo: self.repo,
            commit,
            candidates,
            only_tracked,
            phase: Phase::DirectTip,
            index: 0,
            found_direct: false,
        })
    }
}
