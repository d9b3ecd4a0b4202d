//! `git2`-backed implementation of the git queries

use chrono::{DateTime, Utc};
use git2::{BranchType, ErrorCode, Oid, Sort};

use super::query::{GitQuery, QueryResult};
use super::repo::GitRepo;
use super::types::{BranchLocation, BranchRef, CommitHash, CommitRef, ReflogEntry};
use crate::error::GitQueryError;

fn oid(hash: &CommitHash) -> QueryResult<Oid> {
    Ok(Oid::from_str(hash.as_str())?)
}

fn timestamp(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or_default()
}

fn commit_ref(commit: &git2::Commit<'_>) -> CommitRef {
    CommitRef {
        hash: CommitHash::new(commit.id().to_string()),
        summary: commit.summary().unwrap_or_default().to_string(),
        committed_at: timestamp(commit.time().seconds()),
    }
}

impl GitRepo {
    fn branch_ref(&self, branch: &git2::Branch<'_>, kind: BranchType) -> QueryResult<Option<BranchRef>> {
        let reference = branch.get();
        if reference.kind() == Some(git2::ReferenceType::Symbolic) {
            return Ok(None);
        }

        let (Some(name), Some(full_name)) = (branch.name()?, reference.name()) else {
            tracing::debug!("Skipping branch with a non-UTF-8 name");
            return Ok(None);
        };
        let commit = commit_ref(&reference.peel_to_commit()?);

        let location = match kind {
            BranchType::Local => {
                let upstream = match branch.upstream() {
                    Ok(up) => up.get().name().map(str::to_string),
                    Err(e) => {
                        if e.code() != ErrorCode::NotFound {
                            tracing::debug!(branch = name, error = %e, "Ignoring unreadable upstream");
                        }
                        None
                    }
                };
                BranchLocation::Local { upstream }
            }
            BranchType::Remote => {
                let remote = match self.inner().branch_remote_name(full_name) {
                    Ok(buf) => buf.as_str().unwrap_or_default().to_string(),
                    Err(_) => name.split('/').next().unwrap_or_default().to_string(),
                };
                BranchLocation::Remote { remote }
            }
        };

        Ok(Some(BranchRef {
            name: name.to_string(),
            full_name: full_name.to_string(),
            commit,
            location,
        }))
    }

    fn list_branches(&self, kind: BranchType) -> QueryResult<Vec<BranchRef>> {
        let mut branches = Vec::new();
        for item in self.inner().branches(Some(kind))? {
            let (branch, _) = item?;
            if let Some(branch) = self.branch_ref(&branch, kind)? {
                branches.push(branch);
            }
        }
        Ok(branches)
    }
}

impl GitQuery for GitRepo {
    fn list_local_branches(&self) -> QueryResult<Vec<BranchRef>> {
        self.list_branches(BranchType::Local)
    }

    fn list_remote_branches(&self) -> QueryResult<Vec<BranchRef>> {
        self.list_branches(BranchType::Remote)
    }

    fn list_remotes(&self) -> QueryResult<Vec<String>> {
        let remotes = self.inner().remotes()?;
        Ok(remotes.iter().flatten().map(str::to_string).collect())
    }

    fn reflog(&self, branch: &BranchRef) -> QueryResult<Vec<ReflogEntry>> {
        let reflog = self.inner().reflog(&branch.full_name)?;
        Ok(reflog
            .iter()
            .map(|entry| ReflogEntry {
                old: Some(entry.id_old())
                    .filter(|id| !id.is_zero())
                    .map(|id| CommitHash::new(id.to_string())),
                new: CommitHash::new(entry.id_new().to_string()),
                timestamp: timestamp(entry.committer().when().seconds()),
                message: entry.message().unwrap_or_default().to_string(),
            })
            .collect())
    }

    fn is_ancestor(&self, ancestor: &CommitHash, descendant: &CommitHash) -> QueryResult<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        Ok(self
            .inner()
            .graph_descendant_of(oid(descendant)?, oid(ancestor)?)?)
    }

    fn merge_base(&self, a: &CommitHash, b: &CommitHash) -> QueryResult<Option<CommitRef>> {
        match self.inner().merge_base(oid(a)?, oid(b)?) {
            Ok(base) => Ok(Some(self.find_commit(&CommitHash::new(base.to_string()))?)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn find_commit(&self, hash: &CommitHash) -> QueryResult<CommitRef> {
        let commit = self.inner().find_commit(oid(hash)?)?;
        Ok(commit_ref(&commit))
    }

    fn current_branch(&self) -> QueryResult<Option<String>> {
        let head = match self.inner().head() {
            Ok(h) => h,
            Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(GitQueryError(format!("Failed to get HEAD: {}", e))),
        };

        if head.is_branch() {
            Ok(head.shorthand().map(|s| s.to_string()))
        } else {
            // Detached HEAD
            Ok(None)
        }
    }

    fn commits_between(
        &self,
        tip: &CommitHash,
        base: &CommitHash,
        limit: usize,
    ) -> QueryResult<Vec<CommitRef>> {
        let mut walk = self.inner().revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        walk.push(oid(tip)?)?;
        walk.hide(oid(base)?)?;

        let mut commits = Vec::new();
        for id in walk.take(limit) {
            let commit = self.inner().find_commit(id?)?;
            commits.push(commit_ref(&commit));
        }
        Ok(commits)
    }
}
