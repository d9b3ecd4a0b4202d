//! Read-only git queries the snapshot is built from

use super::types::{BranchRef, CommitHash, CommitRef, ReflogEntry};
use crate::error::GitQueryError;

/// Result type for git queries
pub type QueryResult<T> = std::result::Result<T, GitQueryError>;

/// Narrow read-only view of a git repository
///
/// Everything the snapshot builder knows about git comes through this trait,
/// so it can be backed by `git2` or by an in-memory commit graph.
pub trait GitQuery {
    /// All `refs/heads/*` branches
    fn list_local_branches(&self) -> QueryResult<Vec<BranchRef>>;

    /// All `refs/remotes/*` branches, excluding symbolic `HEAD` refs
    fn list_remote_branches(&self) -> QueryResult<Vec<BranchRef>>;

    /// Names of configured remotes
    fn list_remotes(&self) -> QueryResult<Vec<String>>;

    /// Reflog of a branch, newest entry first
    fn reflog(&self, branch: &BranchRef) -> QueryResult<Vec<ReflogEntry>>;

    /// Whether `ancestor` is reachable from `descendant`; a commit is its own ancestor
    fn is_ancestor(&self, ancestor: &CommitHash, descendant: &CommitHash) -> QueryResult<bool>;

    /// Best common ancestor, `None` for unrelated histories
    fn merge_base(&self, a: &CommitHash, b: &CommitHash) -> QueryResult<Option<CommitRef>>;

    /// Look up commit metadata
    fn find_commit(&self, hash: &CommitHash) -> QueryResult<CommitRef>;

    /// Name of the checked-out branch, `None` when detached or unborn
    fn current_branch(&self) -> QueryResult<Option<String>>;

    /// Commits reachable from `tip` but not from `base`, newest first, at most `limit`
    fn commits_between(
        &self,
        tip: &CommitHash,
        base: &CommitHash,
        limit: usize,
    ) -> QueryResult<Vec<CommitRef>>;
}
