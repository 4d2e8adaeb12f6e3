use crate::domain::{Branch, TagRef};
use crate::error::Result;
use crate::git::CommitInfo;
use git2::{BranchType, ErrorCode, ObjectType, Oid, Repository as Git2Repo, Sort};
use std::path::Path;
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Resolve a revision expression ("HEAD~2", a hash, a tag) to a commit id
    pub fn resolve_commit(&self, spec: &str) -> Result<Oid> {
        let object = self.repo.revparse_single(spec)?;
        Ok(object.peel_to_commit()?.id())
    }

    fn revwalk(&self) -> Result<git2::Revwalk<'_>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        Ok(revwalk)
    }
}

impl super::Repository for Git2Repository {
    fn branches(&self) -> Result<Vec<Branch>> {
        let mut branches = Vec::new();

        for entry in self.repo.branches(None)? {
            let (branch, branch_type) = entry?;
            let reference = branch.get();

            let (Some(canonical_name), Ok(Some(friendly_name))) = (reference.name(), branch.name())
            else {
                debug!("Skipping branch with non UTF-8 name");
                continue;
            };

            // origin/HEAD and friends are symbolic aliases, not branches
            if branch_type == BranchType::Remote && canonical_name.ends_with("/HEAD") {
                continue;
            }

            let tip = reference.resolve().ok().and_then(|r| r.target());
            let is_tracking = branch_type == BranchType::Local && branch.upstream().is_ok();

            branches.push(Branch {
                canonical_name: canonical_name.to_string(),
                friendly_name: friendly_name.to_string(),
                tip,
                is_tracking,
                is_remote: branch_type == BranchType::Remote,
            });
        }

        Ok(branches)
    }

    fn tags(&self) -> Result<Vec<TagRef>> {
        let names = self.repo.tag_names(None)?;
        let mut tags = Vec::new();

        for name in names.iter().flatten() {
            let target = self
                .repo
                .find_reference(&format!("refs/tags/{}", name))
                .and_then(|r| r.peel(ObjectType::Commit))
                .map(|obj| obj.id())
                .ok();

            if target.is_none() {
                debug!("Tag '{}' does not point to a commit", name);
            }

            tags.push(TagRef::new(name, target));
        }

        Ok(tags)
    }

    fn find_commit(&self, oid: Oid) -> Result<CommitInfo> {
        let commit = self.repo.find_commit(oid)?;
        let when = commit.committer().when().seconds();

        Ok(CommitInfo {
            id: oid,
            parents: commit.parent_ids().collect(),
            when,
        })
    }

    fn merge_base(&self, one: Oid, two: Oid) -> Result<Option<Oid>> {
        match self.repo.merge_base(one, two) {
            Ok(oid) => Ok(Some(oid)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn history(&self, tip: Oid) -> Result<Vec<Oid>> {
        let mut revwalk = self.revwalk()?;
        revwalk.push(tip)?;

        Ok(revwalk.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn commits_between(&self, include: Oid, exclude: Oid) -> Result<Vec<CommitInfo>> {
        let mut revwalk = self.revwalk()?;
        revwalk.push(include)?;
        revwalk.hide(exclude)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            commits.push(self.find_commit(oid?)?);
        }

        Ok(commits)
    }

    fn is_reachable_from(&self, commit: Oid, tip: Oid) -> Result<bool> {
        if commit == tip {
            return Ok(true);
        }

        Ok(self.repo.graph_descendant_of(tip, commit)?)
    }
}
