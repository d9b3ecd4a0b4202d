//! Repositories for tests: an in-memory commit graph and throw-away git2 repos

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::DateTime;
use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

use super::query::{GitQuery, QueryResult};
use super::types::{BranchRef, CommitHash, CommitRef, ReflogEntry};
use crate::error::GitQueryError;

#[derive(Debug, Clone)]
struct FakeCommit {
    parents: Vec<CommitHash>,
    time: i64,
}

/// In-memory commit graph implementing [`GitQuery`]
///
/// Commit hashes are arbitrary strings; their summary is the hash itself.
#[derive(Debug, Default)]
pub(crate) struct FakeRepo {
    commits: HashMap<CommitHash, FakeCommit>,
    locals: Vec<BranchRef>,
    remote_branches: Vec<BranchRef>,
    remotes: Vec<String>,
    reflogs: HashMap<String, Vec<ReflogEntry>>,
    current: Option<String>,
    failing_reflog: Option<String>,
}

impl FakeRepo {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a commit whose timestamp is its insertion order
    pub(crate) fn commit(self, hash: &str, parents: &[&str]) -> Self {
        let time = self.commits.len() as i64 + 1;
        self.commit_at(hash, parents, time)
    }

    pub(crate) fn commit_at(mut self, hash: &str, parents: &[&str], time: i64) -> Self {
        self.commits.insert(
            CommitHash::new(hash),
            FakeCommit {
                parents: parents.iter().map(|p| CommitHash::new(*p)).collect(),
                time,
            },
        );
        self
    }

    pub(crate) fn branch(mut self, name: &str, tip: &str) -> Self {
        let commit = self.commit_ref(&CommitHash::new(tip));
        self.locals.push(BranchRef::local(name, commit));
        self
    }

    pub(crate) fn remote(mut self, name: &str) -> Self {
        self.remotes.push(name.to_string());
        self
    }

    /// Add `<remote>/<branch>` at `tip` without configuring it as upstream
    pub(crate) fn remote_branch(mut self, remote: &str, branch: &str, tip: &str) -> Self {
        let commit = self.commit_ref(&CommitHash::new(tip));
        self.remote_branches.push(BranchRef::remote(remote, branch, commit));
        self
    }

    /// Configure the upstream of a local branch
    pub(crate) fn upstream(mut self, branch: &str, remote_branch_full_name: &str) -> Self {
        if let Some(local) = self.locals.iter_mut().find(|b| b.name == branch) {
            *local = local.clone().with_upstream(remote_branch_full_name);
        }
        self
    }

    /// Reflog entries as `(old, new)` pairs, newest first
    pub(crate) fn reflog(mut self, branch: &str, entries: &[(Option<&str>, &str)]) -> Self {
        let entries = entries
            .iter()
            .map(|(old, new)| ReflogEntry {
                old: old.map(CommitHash::new),
                new: CommitHash::new(*new),
                timestamp: DateTime::default(),
                message: String::new(),
            })
            .collect();
        self.reflogs.insert(format!("refs/heads/{}", branch), entries);
        self
    }

    pub(crate) fn checkout(mut self, branch: &str) -> Self {
        self.current = Some(branch.to_string());
        self
    }

    pub(crate) fn fail_reflog_of(mut self, branch: &str) -> Self {
        self.failing_reflog = Some(format!("refs/heads/{}", branch));
        self
    }

    pub(crate) fn hash(hash: &str) -> CommitHash {
        CommitHash::new(hash)
    }

    fn commit_ref(&self, hash: &CommitHash) -> CommitRef {
        let time = self.commits.get(hash).map(|c| c.time).unwrap_or_default();
        CommitRef {
            hash: hash.clone(),
            summary: hash.to_string(),
            committed_at: DateTime::from_timestamp(time, 0).unwrap_or_default(),
        }
    }

    fn ancestors(&self, start: &CommitHash) -> HashSet<CommitHash> {
        let mut seen = HashSet::new();
        let mut stack = vec![start.clone()];
        while let Some(hash) = stack.pop() {
            if !seen.insert(hash.clone()) {
                continue;
            }
            if let Some(commit) = self.commits.get(&hash) {
                stack.extend(commit.parents.iter().cloned());
            }
        }
        seen
    }

    fn known(&self, hash: &CommitHash) -> QueryResult<()> {
        if self.commits.contains_key(hash) {
            Ok(())
        } else {
            Err(GitQueryError(format!("unknown commit {}", hash)))
        }
    }
}

impl GitQuery for FakeRepo {
    fn list_local_branches(&self) -> QueryResult<Vec<BranchRef>> {
        Ok(self.locals.clone())
    }

    fn list_remote_branches(&self) -> QueryResult<Vec<BranchRef>> {
        Ok(self.remote_branches.clone())
    }

    fn list_remotes(&self) -> QueryResult<Vec<String>> {
        Ok(self.remotes.clone())
    }

    fn reflog(&self, branch: &BranchRef) -> QueryResult<Vec<ReflogEntry>> {
        if self.failing_reflog.as_deref() == Some(branch.full_name.as_str()) {
            return Err(GitQueryError(format!("cannot read reflog of {}", branch.name)));
        }
        Ok(self.reflogs.get(&branch.full_name).cloned().unwrap_or_default())
    }

    fn is_ancestor(&self, ancestor: &CommitHash, descendant: &CommitHash) -> QueryResult<bool> {
        self.known(ancestor)?;
        self.known(descendant)?;
        Ok(self.ancestors(descendant).contains(ancestor))
    }

    fn merge_base(&self, a: &CommitHash, b: &CommitHash) -> QueryResult<Option<CommitRef>> {
        self.known(a)?;
        self.known(b)?;
        let of_b = self.ancestors(b);
        let common: Vec<CommitHash> = self
            .ancestors(a)
            .into_iter()
            .filter(|h| of_b.contains(h))
            .collect();

        // best common ancestors are those no other common ancestor descends from
        let best = common
            .iter()
            .filter(|candidate| {
                !common
                    .iter()
                    .any(|other| other != *candidate && self.ancestors(other).contains(*candidate))
            })
            .max_by_key(|h| (self.commits.get(*h).map(|c| c.time), (*h).clone()));

        Ok(best.map(|h| self.commit_ref(h)))
    }

    fn find_commit(&self, hash: &CommitHash) -> QueryResult<CommitRef> {
        self.known(hash)?;
        Ok(self.commit_ref(hash))
    }

    fn current_branch(&self) -> QueryResult<Option<String>> {
        Ok(self.current.clone())
    }

    fn commits_between(
        &self,
        tip: &CommitHash,
        base: &CommitHash,
        limit: usize,
    ) -> QueryResult<Vec<CommitRef>> {
        self.known(tip)?;
        let hidden = self.ancestors(base);
        let mut commits: Vec<CommitRef> = self
            .ancestors(tip)
            .into_iter()
            .filter(|h| !hidden.contains(h))
            .map(|h| self.commit_ref(&h))
            .collect();
        commits.sort_by(|x, y| y.committed_at.cmp(&x.committed_at).then(y.hash.cmp(&x.hash)));
        commits.truncate(limit);
        Ok(commits)
    }
}

/// A throw-away on-disk repository built with git2
pub(crate) struct TestRepo {
    dir: TempDir,
    repo: Repository,
}

impl TestRepo {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_bool("core.logAllRefUpdates", true).unwrap();
            config.set_str("user.name", "Test").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        Self { dir, repo }
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commit an empty tree on top of `branch`, creating the branch if needed
    pub(crate) fn commit(&self, branch: &str, message: &str, time: i64) -> CommitHash {
        let sig = Signature::new("Test", "test@example.com", &git2::Time::new(time, 0)).unwrap();
        let refname = format!("refs/heads/{}", branch);
        let parent = self
            .repo
            .find_reference(&refname)
            .ok()
            .and_then(|r| r.peel_to_commit().ok());
        let tree_id = self.repo.treebuilder(None).unwrap().write().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let id = self
            .repo
            .commit(Some(&refname), &sig, &sig, message, &tree, &parents)
            .unwrap();
        CommitHash::new(id.to_string())
    }

    pub(crate) fn branch(&self, name: &str, at: &CommitHash) {
        let commit = self.repo.find_commit(Oid::from_str(at.as_str()).unwrap()).unwrap();
        self.repo.branch(name, &commit, false).unwrap();
    }

    /// Force-move a branch, as `git reset --hard` would
    pub(crate) fn reset(&self, name: &str, to: &CommitHash) {
        self.repo
            .reference(
                &format!("refs/heads/{}", name),
                Oid::from_str(to.as_str()).unwrap(),
                true,
                "reset: moving",
            )
            .unwrap();
    }

    /// Add a linked worktree at `path` on a new branch `name`
    pub(crate) fn add_worktree(&self, name: &str, path: &Path) {
        self.repo.worktree(name, path, None).unwrap();
    }

    pub(crate) fn checkout(&self, name: &str) {
        self.repo.set_head(&format!("refs/heads/{}", name)).unwrap();
    }

    /// Add a remote, a remote-tracking branch for `branch` at `at`, and configure it as upstream
    pub(crate) fn track(&self, remote: &str, branch: &str, at: &CommitHash) {
        if self.repo.find_remote(remote).is_err() {
            self.repo
                .remote(remote, &format!("https://example.com/{}.git", remote))
                .unwrap();
        }
        self.repo
            .reference(
                &format!("refs/remotes/{}/{}", remote, branch),
                Oid::from_str(at.as_str()).unwrap(),
                true,
                "fetch",
            )
            .unwrap();
        let mut config = self.repo.config().unwrap();
        config
            .set_str(&format!("branch.{}.remote", branch), remote)
            .unwrap();
        config
            .set_str(&format!("branch.{}.merge", branch), &format!("refs/heads/{}", branch))
            .unwrap();
    }
}
