//! Fork point resolution
//!
//! The fork point of a branch is the commit its own history is judged to
//! start from, i.e. the lower bound handed to `git rebase --onto`. Reflogs
//! are the primary evidence; the merge-base with the parent is the fallback.

use serde::Serialize;

use crate::git::{BranchRef, CommitHash, CommitRef, GitQuery, QueryResult};

/// Which evidence a fork point was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForkPointSource {
    /// An earlier position of the branch recorded in its reflog
    Reflog,
    /// The merge-base of the branch and its parent
    MergeBase,
}

/// A resolved fork point
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForkPoint {
    /// The commit the branch diverged at
    pub commit: CommitRef,
    /// Where it came from
    pub source: ForkPointSource,
    /// A more recent merge-base that was passed over; worth a manual look
    pub alternative: Option<CommitRef>,
}

impl ForkPoint {
    /// Whether two plausible fork points were found
    pub fn is_ambiguous(&self) -> bool {
        self.alternative.is_some()
    }
}

/// Find where `branch` diverged from `parent`
///
/// `other_tips` are tips of local branches that may vouch for a reflog
/// candidate (the caller leaves out `branch`, `parent` and everything declared
/// under `branch`). Returns `Ok(None)` when the histories are unrelated and
/// the reflog offers nothing; query failures are returned as errors.
pub fn resolve_fork_point<G: GitQuery + ?Sized>(
    git: &G,
    branch: &BranchRef,
    parent: &BranchRef,
    other_tips: &[CommitHash],
) -> QueryResult<Option<ForkPoint>> {
    let tip = branch.tip();
    let merge_base = git.merge_base(tip, parent.tip())?;

    let witnesses = witnesses(git, branch, parent, other_tips)?;
    let candidate = reflog_candidate(git, branch, &witnesses)?;

    let fork_point = match (candidate, merge_base) {
        (Some(commit), merge_base) => {
            let alternative = match merge_base {
                Some(base) if base != commit => {
                    if git.is_ancestor(&commit.hash, &base.hash)? {
                        tracing::warn!(
                            branch = %branch.name,
                            fork_point = %commit.hash,
                            merge_base = %base.hash,
                            "Fork point from reflog is older than the merge-base with the parent"
                        );
                        Some(base)
                    } else {
                        None
                    }
                }
                _ => None,
            };
            Some(ForkPoint {
                commit,
                source: ForkPointSource::Reflog,
                alternative,
            })
        }
        (None, Some(base)) => Some(ForkPoint {
            commit: base,
            source: ForkPointSource::MergeBase,
            alternative: None,
        }),
        (None, None) => None,
    };

    match &fork_point {
        Some(fp) => tracing::debug!(
            branch = %branch.name,
            fork_point = %fp.commit.hash,
            source = ?fp.source,
            "Resolved fork point"
        ),
        None => tracing::debug!(branch = %branch.name, "No fork point"),
    }
    Ok(fork_point)
}

/// Commits whose history may vouch for a reflog candidate: the parent's
/// current and past tips, plus the given tips that do not build on `branch`
fn witnesses<G: GitQuery + ?Sized>(
    git: &G,
    branch: &BranchRef,
    parent: &BranchRef,
    other_tips: &[CommitHash],
) -> QueryResult<Vec<CommitHash>> {
    let mut witnesses = vec![parent.tip().clone()];
    for entry in git.reflog(parent)? {
        if !witnesses.contains(&entry.new) {
            witnesses.push(entry.new);
        }
    }
    for other in other_tips {
        if witnesses.contains(other) || git.is_ancestor(branch.tip(), other)? {
            continue;
        }
        witnesses.push(other.clone());
    }
    Ok(witnesses)
}

/// Most recent earlier position of `branch` that is still in its history and
/// is vouched for by a witness
fn reflog_candidate<G: GitQuery + ?Sized>(
    git: &G,
    branch: &BranchRef,
    witnesses: &[CommitHash],
) -> QueryResult<Option<CommitRef>> {
    let tip = branch.tip();

    for entry in git.reflog(branch)? {
        let Some(old) = &entry.old else {
            continue;
        };

        // entries older than a rewrite (rebase, reset, amend) are superseded
        if !git.is_ancestor(old, &entry.new)? {
            tracing::debug!(branch = %branch.name, rewritten_from = %old, "Reflog scan stopped at rewrite");
            break;
        }

        if !git.is_ancestor(old, tip)? {
            continue;
        }
        for witness in witnesses {
            if git.is_ancestor(old, witness)? {
                return Ok(Some(git.find_commit(old)?));
            }
        }
    }
    Ok(None)
}
