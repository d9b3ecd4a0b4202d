//! Sync statuses of a branch relative to its parent and its remote

use std::fmt;

use serde::Serialize;

use crate::git::{BranchRef, CommitHash, GitQuery, QueryResult};

/// How a branch relates to its parent in the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncToParentStatus {
    /// Branch tip descends from (or equals) the parent tip and the fork point is the parent tip
    InSync,
    /// Branch tip descends from the parent tip but the fork point is elsewhere
    InSyncButForkPointOff,
    /// Branch tip does not descend from the parent tip
    OutOfSync,
    /// Parent tip descends from the branch tip
    MergedToParent,
}

impl SyncToParentStatus {
    /// Short human-readable description
    pub fn description(self) -> &'static str {
        match self {
            SyncToParentStatus::InSync => "in sync",
            SyncToParentStatus::InSyncButForkPointOff => "fork point off",
            SyncToParentStatus::OutOfSync => "out of sync",
            SyncToParentStatus::MergedToParent => "merged",
        }
    }
}

impl fmt::Display for SyncToParentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Classify a branch against its parent
pub fn sync_to_parent_status<G: GitQuery + ?Sized>(
    git: &G,
    tip: &CommitHash,
    parent_tip: &CommitHash,
    fork_point: Option<&CommitHash>,
) -> QueryResult<SyncToParentStatus> {
    if tip == parent_tip {
        return Ok(SyncToParentStatus::InSync);
    }
    if git.is_ancestor(tip, parent_tip)? {
        return Ok(SyncToParentStatus::MergedToParent);
    }
    if git.is_ancestor(parent_tip, tip)? {
        return Ok(match fork_point {
            Some(fp) if fp != parent_tip => SyncToParentStatus::InSyncButForkPointOff,
            _ => SyncToParentStatus::InSync,
        });
    }
    Ok(SyncToParentStatus::OutOfSync)
}

/// How a local branch relates to its remote-tracking branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// The repository has no remotes at all
    NoRemotes,
    /// No remote-tracking branch could be found
    Untracked,
    /// Same commit
    InSyncToRemote,
    /// Remote tip is an ancestor of the local tip
    AheadOfRemote,
    /// Local tip is an ancestor of the remote tip
    BehindRemote,
    /// Histories diverged and the local tip was committed later
    DivergedFromAndNewerThanRemote,
    /// Histories diverged and the local tip was committed earlier
    DivergedFromAndOlderThanRemote,
}

impl Relation {
    /// A fast-forward-only pull makes sense
    pub fn can_pull_fast_forward(self) -> bool {
        matches!(self, Relation::BehindRemote | Relation::InSyncToRemote)
    }

    /// Resetting the local branch to its remote makes sense
    pub fn can_reset_to_remote(self) -> bool {
        !matches!(self, Relation::NoRemotes | Relation::Untracked)
    }

    /// Pushing the local branch makes sense
    pub fn can_push(self) -> bool {
        matches!(
            self,
            Relation::AheadOfRemote | Relation::Untracked | Relation::DivergedFromAndNewerThanRemote
        )
    }
}

/// Relation to the remote, plus the remote involved
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SyncToRemoteStatus {
    /// How the tips relate
    pub relation: Relation,
    /// Remote of the tracking branch, when there is one
    pub remote_name: Option<String>,
}

impl SyncToRemoteStatus {
    fn without_remote(relation: Relation) -> Self {
        Self {
            relation,
            remote_name: None,
        }
    }
}

impl fmt::Display for SyncToRemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let remote = self.remote_name.as_deref().unwrap_or("remote");
        match self.relation {
            Relation::NoRemotes => f.write_str("no remotes"),
            Relation::Untracked => f.write_str("untracked"),
            Relation::InSyncToRemote => write!(f, "in sync with {}", remote),
            Relation::AheadOfRemote => write!(f, "ahead of {}", remote),
            Relation::BehindRemote => write!(f, "behind {}", remote),
            Relation::DivergedFromAndNewerThanRemote => {
                write!(f, "diverged from (and newer than) {}", remote)
            }
            Relation::DivergedFromAndOlderThanRemote => {
                write!(f, "diverged from (and older than) {}", remote)
            }
        }
    }
}

/// Pick the remote-tracking branch of `local`
///
/// The configured upstream wins; otherwise `origin/<name>`, otherwise
/// `<remote>/<name>` when there is exactly one remote.
pub fn find_remote_tracking<'a>(
    local: &BranchRef,
    remote_branches: &'a [BranchRef],
    remotes: &[String],
) -> Option<&'a BranchRef> {
    let by_full_name = |full_name: &str| remote_branches.iter().find(|r| r.full_name == full_name);

    if let Some(upstream) = local.upstream() {
        if let Some(found) = by_full_name(upstream) {
            return Some(found);
        }
    }
    if let Some(found) = by_full_name(&format!("refs/remotes/origin/{}", local.name)) {
        return Some(found);
    }
    match remotes {
        [only] => by_full_name(&format!("refs/remotes/{}/{}", only, local.name)),
        _ => None,
    }
}

/// Classify a local branch against its remote-tracking branch
pub fn sync_to_remote_status<G: GitQuery + ?Sized>(
    git: &G,
    local: &BranchRef,
    remote: Option<&BranchRef>,
    has_remotes: bool,
) -> QueryResult<SyncToRemoteStatus> {
    if !has_remotes {
        return Ok(SyncToRemoteStatus::without_remote(Relation::NoRemotes));
    }
    let Some(remote) = remote else {
        return Ok(SyncToRemoteStatus::without_remote(Relation::Untracked));
    };

    let relation = if local.tip() == remote.tip() {
        Relation::InSyncToRemote
    } else if git.is_ancestor(remote.tip(), local.tip())? {
        Relation::AheadOfRemote
    } else if git.is_ancestor(local.tip(), remote.tip())? {
        Relation::BehindRemote
    } else if local.commit.committed_at > remote.commit.committed_at {
        Relation::DivergedFromAndNewerThanRemote
    } else {
        Relation::DivergedFromAndOlderThanRemote
    };

    Ok(SyncToRemoteStatus {
        relation,
        remote_name: remote.remote_name().map(str::to_string),
    })
}
