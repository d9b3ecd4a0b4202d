//! Commit and branch values read from git

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Hex object id of a commit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CommitHash(String);

impl CommitHash {
    /// Wrap a hex object id
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Full hex id
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated id for display
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommitHash {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A commit: identity plus summary metadata
///
/// Equality and hashing only look at the hash.
#[derive(Debug, Clone, Serialize)]
pub struct CommitRef {
    /// Object id
    pub hash: CommitHash,
    /// First line of the message
    pub summary: String,
    /// Committer timestamp
    pub committed_at: DateTime<Utc>,
}

impl PartialEq for CommitRef {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for CommitRef {}

impl Hash for CommitRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

/// One update of a branch, as recorded in its reflog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReflogEntry {
    /// Commit the branch pointed to before; `None` when the branch was created
    pub old: Option<CommitHash>,
    /// Commit the branch pointed to after
    pub new: CommitHash,
    /// When the update happened
    pub timestamp: DateTime<Utc>,
    /// Reflog message, e.g. `commit: fix typo`
    pub message: String,
}

/// Where a branch ref lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum BranchLocation {
    /// `refs/heads/*`, with the full name of its configured upstream if any
    Local { upstream: Option<String> },
    /// `refs/remotes/<remote>/*`
    Remote { remote: String },
}

/// A local or remote-tracking branch and the commit it points to
///
/// Two branch refs are equal iff their full names and pointed commits are.
#[derive(Debug, Clone, Serialize)]
pub struct BranchRef {
    /// `X` for `refs/heads/X`, `origin/X` for `refs/remotes/origin/X`
    pub name: String,
    /// Full reference name
    pub full_name: String,
    /// Pointed commit
    pub commit: CommitRef,
    /// Local or remote
    pub location: BranchLocation,
}

impl PartialEq for BranchRef {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name && self.commit == other.commit
    }
}

impl Eq for BranchRef {}

impl BranchRef {
    /// A local branch `refs/heads/<name>` with no upstream
    pub fn local(name: impl Into<String>, commit: CommitRef) -> Self {
        let name = name.into();
        Self {
            full_name: format!("refs/heads/{}", name),
            name,
            commit,
            location: BranchLocation::Local { upstream: None },
        }
    }

    /// A remote-tracking branch `refs/remotes/<remote>/<branch>`
    pub fn remote(remote: impl Into<String>, branch: &str, commit: CommitRef) -> Self {
        let remote = remote.into();
        Self {
            name: format!("{}/{}", remote, branch),
            full_name: format!("refs/remotes/{}/{}", remote, branch),
            commit,
            location: BranchLocation::Remote { remote },
        }
    }

    /// Set the configured upstream of a local branch
    pub fn with_upstream(mut self, upstream: impl Into<String>) -> Self {
        if let BranchLocation::Local { upstream: slot } = &mut self.location {
            *slot = Some(upstream.into());
        }
        self
    }

    /// Whether this is a `refs/heads/*` branch
    pub fn is_local(&self) -> bool {
        matches!(self.location, BranchLocation::Local { .. })
    }

    /// Configured upstream full name of a local branch
    pub fn upstream(&self) -> Option<&str> {
        match &self.location {
            BranchLocation::Local { upstream } => upstream.as_deref(),
            BranchLocation::Remote { .. } => None,
        }
    }

    /// Remote name of a remote-tracking branch
    pub fn remote_name(&self) -> Option<&str> {
        match &self.location {
            BranchLocation::Remote { remote } => Some(remote),
            BranchLocation::Local { .. } => None,
        }
    }

    /// Hash of the pointed commit
    pub fn tip(&self) -> &CommitHash {
        &self.commit.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str) -> CommitRef {
        CommitRef {
            hash: CommitHash::new(hash),
            summary: String::new(),
            committed_at: DateTime::default(),
        }
    }

    #[test]
    fn test_branch_equality_uses_full_name_and_commit() {
        let a = BranchRef::local("feature", commit("aaaa"));
        let same = BranchRef::local("feature", commit("aaaa")).with_upstream("refs/remotes/origin/feature");
        let moved = BranchRef::local("feature", commit("bbbb"));
        assert_eq!(a, same);
        assert_ne!(a, moved);
    }

    #[test]
    fn test_remote_names() {
        let r = BranchRef::remote("origin", "feature/x", commit("aaaa"));
        assert_eq!(r.name, "origin/feature/x");
        assert_eq!(r.full_name, "refs/remotes/origin/feature/x");
        assert_eq!(r.remote_name(), Some("origin"));
        assert!(!r.is_local());
    }

    #[test]
    fn test_short_hash() {
        assert_eq!(CommitHash::new("0123456789abcdef").short(), "0123456");
        assert_eq!(CommitHash::new("abc").short(), "abc");
    }
}
