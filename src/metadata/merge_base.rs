use super::RepositoryMetadata;
use crate::domain::{Branch, MergeBaseResult};
use crate::error::{LineageError, Result};
use crate::git::{CommitInfo, Repository};
use git2::Oid;
use std::collections::HashSet;
use tracing::{debug, info, warn};

impl<'r, R: Repository> RepositoryMetadata<'r, R> {
    /// Where `first` forked from `second`, ignoring forward merges
    ///
    /// A plain merge base of two branches that have been merged into each
    /// other points at the latest merge rather than the fork point. When
    /// `second` contains merges of `first`'s history, the lookup is repeated
    /// from the commit just before each such merge until the answer stops
    /// changing.
    ///
    /// The pair is ordered: `(a, b)` and `(b, a)` are resolved and cached
    /// separately.
    ///
    /// # Returns
    /// * `Ok(Some(Oid))` - The corrected merge base
    /// * `Ok(None)` - The branches share no history
    /// * `Err(InvalidArgument)` - If either branch has no tip
    pub fn find_merge_base(&mut self, first: &Branch, second: &Branch) -> Result<Option<Oid>> {
        let key = (first.key(), second.key());
        if let Some(cached) = self.merge_bases.get(&key) {
            debug!("Using cached merge base of '{}' and '{}'", first, second);
            return Ok(cached.merge_base);
        }

        let (Some(first_tip), Some(second_tip)) = (first.tip, second.tip) else {
            return Err(LineageError::invalid_argument(format!(
                "Cannot find the merge base of '{}' and '{}': both branches need a tip",
                first, second
            )));
        };

        let merge_base = self.resolve_merge_base(first_tip, second_tip)?;
        match merge_base {
            Some(oid) => info!("Merge base of '{}' and '{}' is {}", first, second, oid),
            None => info!("'{}' and '{}' share no history", first, second),
        }

        let (first_key, second_key) = key.clone();
        self.merge_bases.insert(
            key,
            MergeBaseResult {
                first: first_key,
                second: second_key,
                merge_base,
            },
        );

        Ok(merge_base)
    }

    fn resolve_merge_base(&self, tip: Oid, other_tip: Oid) -> Result<Option<Oid>> {
        let mut anchor = other_tip;

        // The other tip is itself a merge of `tip`: start from before it
        let other = self.repo.find_commit(other_tip)?;
        if other.parents.contains(&tip) {
            if let Some(&first_parent) = other.parents.first() {
                debug!("{} merges {} directly; using {}", other_tip, tip, first_parent);
                anchor = first_parent;
            }
        }

        let Some(mut merge_base) = self.repo.merge_base(tip, anchor)? else {
            return Ok(None);
        };

        let mut visited = HashSet::from([anchor]);
        while let Some(forward_merge) = self.find_forward_merge(anchor, merge_base)? {
            let next_anchor = forward_merge.parents[0];
            if !visited.insert(next_anchor) {
                warn!(
                    "Forward merge correction revisited {}; keeping merge base {}",
                    next_anchor, merge_base
                );
                break;
            }

            match self.repo.merge_base(tip, next_anchor)? {
                Some(next) if next == merge_base => {
                    debug!("Merge base {} is stable", merge_base);
                    break;
                }
                Some(next) => {
                    info!(
                        "Merge base {} came from forward merge {}; moving to {}",
                        merge_base, forward_merge.id, next
                    );
                    merge_base = next;
                    anchor = next_anchor;
                }
                None => {
                    warn!(
                        "No merge base between {} and {}; keeping {}",
                        tip, next_anchor, merge_base
                    );
                    break;
                }
            }
        }

        Ok(Some(merge_base))
    }

    /// A merge on `anchor`'s side whose merged-in parent is `merge_base`
    fn find_forward_merge(&self, anchor: Oid, merge_base: Oid) -> Result<Option<CommitInfo>> {
        Ok(self
            .repo
            .commits_between(anchor, merge_base)?
            .into_iter()
            .find(|c| c.is_merge() && c.parents[1..].contains(&merge_base)))
    }
}
