use super::RepositoryMetadata;
use crate::domain::{Branch, SemanticVersion, Tag, TagPrefix};
use crate::error::Result;
use crate::git::Repository;
use git2::Oid;
use std::collections::HashMap;
use tracing::{debug, warn};

impl<'r, R: Repository> RepositoryMetadata<'r, R> {
    /// Tags whose names parse as semantic versions under `prefix`
    ///
    /// Tags that do not peel to a commit are skipped, as are tags on commits
    /// newer than `older_than` (seconds since the epoch) when given. Never
    /// cached, so `older_than` can vary between calls.
    pub fn valid_version_tags(
        &self,
        prefix: &TagPrefix,
        older_than: Option<i64>,
    ) -> Result<Vec<(Tag, SemanticVersion)>> {
        let mut valid = Vec::new();

        for tag_ref in self.repo.tags()? {
            let Some(tag) = tag_ref.peeled() else {
                continue;
            };

            if let Some(cutoff) = older_than {
                if self.repo.find_commit(tag.target)?.when > cutoff {
                    continue;
                }
            }

            if let Some(version) = prefix.parse(&tag.name) {
                valid.push((tag, version));
            }
        }

        Ok(valid)
    }

    /// Versions tagged on the branch's history, in history order
    pub fn version_tags_on_branch(
        &mut self,
        branch: &Branch,
        prefix: &TagPrefix,
    ) -> Result<Vec<SemanticVersion>> {
        let key = branch.key();
        if let Some(cached) = self.version_tags.get(&key) {
            debug!("Using cached version tags for branch '{}'", branch);
            return Ok(cached.clone());
        }

        let versions = match branch.tip {
            Some(tip) => {
                let mut by_commit: HashMap<Oid, Vec<SemanticVersion>> = HashMap::new();
                for (tag, version) in self.valid_version_tags(prefix, None)? {
                    by_commit.entry(tag.target).or_default().push(version);
                }

                let mut versions = Vec::new();
                for commit in self.repo.history(tip)? {
                    if let Some(tagged) = by_commit.remove(&commit) {
                        versions.extend(tagged);
                    }
                }
                versions
            }
            None => {
                warn!("Branch '{}' has no tip; it carries no version tags", branch);
                Vec::new()
            }
        };

        self.version_tags.insert(key, versions.clone());
        Ok(versions)
    }

    /// Highest version tagged directly on `commit`, if any
    pub fn tagged_version_on_commit(
        &self,
        commit: Oid,
        prefix: &TagPrefix,
    ) -> Result<Option<SemanticVersion>> {
        Ok(self
            .valid_version_tags(prefix, None)?
            .into_iter()
            .filter(|(tag, _)| tag.target == commit)
            .map(|(_, version)| version)
            .max())
    }
}
