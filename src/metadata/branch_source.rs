use super::RepositoryMetadata;
use crate::config::Config;
use crate::domain::{Branch, BranchCommit};
use crate::error::Result;
use crate::git::Repository;
use tracing::{debug, warn};

impl<'r, R: Repository> RepositoryMetadata<'r, R> {
    /// The branch `branch` was most likely created from
    ///
    /// Candidates are the repository's branches allowed as sources by
    /// `config`, minus `branch` itself (local or remote copies) and
    /// `excluded`. Each candidate is
    /// paired with its merge base against `branch`; the candidate with the
    /// most recent merge base wins. Ties keep enumeration order, and any
    /// ambiguity is logged with the full candidate list.
    ///
    /// A branch without a tip yields the empty [BranchCommit].
    pub fn find_branch_source(
        &mut self,
        branch: &Branch,
        config: &Config,
        excluded: &[Branch],
    ) -> Result<BranchCommit> {
        if branch.tip.is_none() {
            warn!("Branch '{}' has no tip; cannot find its source", branch);
            return Ok(BranchCommit::empty());
        }

        let candidates: Vec<BranchCommit> = self
            .source_candidates(branch, config, excluded)?
            .into_iter()
            .filter(|c| c.branch.as_ref().is_some_and(|b| !b.is_same_branch(branch)))
            .collect();

        match candidates.as_slice() {
            [] => Ok(BranchCommit::empty()),
            [only] => Ok(only.clone()),
            [first, ..] => {
                let options: Vec<String> = candidates.iter().map(|c| c.to_string()).collect();
                warn!(
                    "Multiple source branches found for '{}', picking '{}'. Options were: {}",
                    branch,
                    first,
                    options.join(", ")
                );
                Ok(first.clone())
            }
        }
    }

    /// Candidate sources of `branch`, most recent merge base first
    fn source_candidates(
        &mut self,
        branch: &Branch,
        config: &Config,
        excluded: &[Branch],
    ) -> Result<Vec<BranchCommit>> {
        let key = branch.key();
        if let Some(cached) = self.source_candidates.get(&key) {
            debug!("Using cached source candidates for '{}'", branch);
            return Ok(cached.clone());
        }

        let patterns = config.source_branch_patterns(branch.name_without_remote())?;
        let mut ranked = Vec::new();

        for other in self.repo.branches()? {
            if other.is_same_branch(branch) || excluded.iter().any(|e| e.is_same_ref(&other)) {
                continue;
            }
            if !patterns
                .iter()
                .any(|p| p.is_match(other.name_without_remote()))
            {
                continue;
            }
            if other.tip.is_none() {
                debug!("Skipping source candidate '{}' without a tip", other);
                continue;
            }

            if let Some(merge_base) = self.find_merge_base(branch, &other)? {
                let when = self.repo.find_commit(merge_base)?.when;
                ranked.push((when, BranchCommit::new(merge_base, other)));
            }
        }

        // stable: equal times keep enumeration order
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        let candidates: Vec<BranchCommit> = ranked.into_iter().map(|(_, c)| c).collect();

        self.source_candidates.insert(key, candidates.clone());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::domain::{Branch, BranchCommit};
    use crate::git::MockRepository;
    use crate::metadata::RepositoryMetadata;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, buffer.contents())
    }

    #[test]
    fn test_picks_most_recent_fork_point() {
        let mut repo = MockRepository::new();
        let m0 = repo.commit(&[], 100);
        let m1 = repo.commit(&[m0], 200);
        let d1 = repo.commit(&[m1], 300);
        let f1 = repo.commit(&[d1], 400);
        let m2 = repo.commit(&[m1], 500);
        repo.set_branch("main", Some(m2));
        repo.set_branch("develop", Some(d1));
        let feature = repo.set_branch("feature/x", Some(f1));

        let mut metadata = RepositoryMetadata::new(&repo);
        let source = metadata
            .find_branch_source(&feature, &Config::default(), &[])
            .unwrap();

        assert_eq!(source.commit, Some(d1));
        assert_eq!(source.branch.unwrap().friendly_name, "develop");
    }

    #[test]
    fn test_respects_configured_sources() {
        // develop may only come from main, so feature/y is never a candidate
        let mut repo = MockRepository::new();
        let m0 = repo.commit(&[], 100);
        let f1 = repo.commit(&[m0], 200);
        let d1 = repo.commit(&[f1], 300);
        repo.set_branch("main", Some(m0));
        repo.set_branch("feature/y", Some(f1));
        let develop = repo.set_branch("develop", Some(d1));

        let mut metadata = RepositoryMetadata::new(&repo);
        let source = metadata
            .find_branch_source(&develop, &Config::default(), &[])
            .unwrap();

        assert_eq!(source.branch.unwrap().friendly_name, "main");
    }

    #[test]
    fn test_excluded_branches_are_skipped() {
        let mut repo = MockRepository::new();
        let m0 = repo.commit(&[], 100);
        let d1 = repo.commit(&[m0], 200);
        let f1 = repo.commit(&[d1], 300);
        repo.set_branch("main", Some(m0));
        let develop = repo.set_branch("develop", Some(d1));
        let feature = repo.set_branch("feature/x", Some(f1));

        let mut metadata = RepositoryMetadata::new(&repo);
        let source = metadata
            .find_branch_source(&feature, &Config::default(), &[develop])
            .unwrap();

        assert_eq!(source.branch.unwrap().friendly_name, "main");
    }

    #[test]
    fn test_ambiguous_sources_pick_first_and_log_all() {
        let mut repo = MockRepository::new();
        let m0 = repo.commit(&[], 100);
        let m1 = repo.commit(&[m0], 200);
        let f1 = repo.commit(&[m1], 300);
        repo.set_branch("main", Some(m1));
        repo.set_branch("develop", Some(m1));
        let feature = repo.set_branch("feature/x", Some(f1));

        let mut metadata = RepositoryMetadata::new(&repo);
        let (source, logs) = capture_logs(|| {
            metadata
                .find_branch_source(&feature, &Config::default(), &[])
                .unwrap()
        });

        assert_eq!(source.commit, Some(m1));
        assert_eq!(source.branch.unwrap().friendly_name, "main");
        assert!(logs.contains("Multiple source branches"), "logs: {}", logs);
        assert!(logs.contains("main @"), "logs: {}", logs);
        assert!(logs.contains("develop @"), "logs: {}", logs);
    }

    #[test]
    fn test_no_tip_returns_empty() {
        let repo = MockRepository::new();
        let mut metadata = RepositoryMetadata::new(&repo);

        let (source, logs) = capture_logs(|| {
            metadata
                .find_branch_source(&Branch::local("feature/ghost", None), &Config::default(), &[])
                .unwrap()
        });

        assert_eq!(source, BranchCommit::empty());
        assert!(logs.contains("has no tip"), "logs: {}", logs);
    }

    #[test]
    fn test_no_candidates_returns_empty() {
        let mut repo = MockRepository::new();
        let root = repo.commit(&[], 100);
        let other_root = repo.commit(&[], 200);
        repo.set_branch("main", Some(other_root));
        let feature = repo.set_branch("feature/x", Some(root));

        let mut metadata = RepositoryMetadata::new(&repo);
        let source = metadata
            .find_branch_source(&feature, &Config::default(), &[])
            .unwrap();
        assert!(source.is_empty());
    }

    #[test]
    fn test_candidates_are_cached() {
        let mut repo = MockRepository::new();
        let m0 = repo.commit(&[], 100);
        let f1 = repo.commit(&[m0], 200);
        repo.set_branch("main", Some(m0));
        let feature = repo.set_branch("feature/x", Some(f1));

        let mut metadata = RepositoryMetadata::new(&repo);
        let config = Config::default();
        let first = metadata.find_branch_source(&feature, &config, &[]).unwrap();
        let calls = repo.merge_base_calls();
        let second = metadata.find_branch_source(&feature, &config, &[]).unwrap();

        assert_eq!(first, second);
        assert_eq!(repo.merge_base_calls(), calls);
    }

    #[test]
    fn test_remote_branches_match_without_remote_prefix() {
        let mut repo = MockRepository::new();
        let m0 = repo.commit(&[], 100);
        let f1 = repo.commit(&[m0], 200);
        repo.set_remote_branch("origin", "main", Some(m0));
        let feature = repo.set_branch("feature/x", Some(f1));

        let mut metadata = RepositoryMetadata::new(&repo);
        let source = metadata
            .find_branch_source(&feature, &Config::default(), &[])
            .unwrap();
        assert_eq!(source.branch.unwrap().friendly_name, "origin/main");
    }

    #[test]
    fn test_own_remote_copy_is_not_a_source() {
        // origin/feature/x sits on the same tip as feature/x
        let mut repo = MockRepository::new();
        let m0 = repo.commit(&[], 100);
        let d1 = repo.commit(&[m0], 200);
        let f1 = repo.commit(&[d1], 300);
        repo.set_branch("main", Some(m0));
        repo.set_branch("develop", Some(d1));
        let feature = repo.set_branch("feature/x", Some(f1));
        repo.set_remote_branch("origin", "feature/x", Some(f1));

        let mut metadata = RepositoryMetadata::new(&repo);
        let (source, logs) = capture_logs(|| {
            metadata
                .find_branch_source(&feature, &Config::default(), &[])
                .unwrap()
        });

        assert_eq!(source.commit, Some(d1));
        assert_eq!(source.branch.unwrap().friendly_name, "develop");
        assert!(!logs.contains("origin/feature/x @"), "logs: {}", logs);
    }

    #[test]
    fn test_remote_branch_skips_local_copy_on_same_tip() {
        let mut repo = MockRepository::new();
        let m0 = repo.commit(&[], 100);
        let d1 = repo.commit(&[m0], 200);
        let f1 = repo.commit(&[d1], 300);
        repo.set_branch("main", Some(m0));
        repo.set_remote_branch("origin", "develop", Some(d1));
        repo.put_branch(Branch::local("feature/x", Some(f1)).tracking());
        let remote_feature = repo.set_remote_branch("origin", "feature/x", Some(f1));

        let mut metadata = RepositoryMetadata::new(&repo);
        let source = metadata
            .find_branch_source(&remote_feature, &Config::default(), &[])
            .unwrap();

        assert_eq!(source.commit, Some(d1));
        assert_eq!(source.branch.unwrap().friendly_name, "origin/develop");
    }
}
