//! Managed branches: layout entries bound to git branches

use serde::Serialize;

use super::fork_point::ForkPoint;
use super::status::{SyncToParentStatus, SyncToRemoteStatus};
use crate::error::MissingForkPointError;
use crate::git::{BranchRef, CommitHash, CommitRef};

/// Index of a branch within the snapshot that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BranchId(pub(crate) usize);

impl BranchId {
    /// Position in pre-order
    pub fn index(self) -> usize {
        self.0
    }
}

/// Fields only non-root branches have
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NonRootInfo {
    /// The branch this one is declared under
    pub parent: BranchId,
    /// Where this branch diverged from its parent, when it could be found
    pub fork_point: Option<ForkPoint>,
    /// Relation to the parent
    pub sync_to_parent: SyncToParentStatus,
}

/// Root or non-root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BranchKind {
    /// Top-level layout entry
    Root,
    /// Declared under another branch
    NonRoot(NonRootInfo),
}

/// A branch present in both the layout and the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagedBranch {
    pub(super) id: BranchId,
    pub(super) branch: BranchRef,
    pub(super) annotation: Option<String>,
    pub(super) children: Vec<BranchId>,
    pub(super) remote_tracking: Option<BranchRef>,
    pub(super) sync_to_remote: SyncToRemoteStatus,
    pub(super) commits: Vec<CommitRef>,
    #[serde(flatten)]
    pub(super) kind: BranchKind,
}

impl ManagedBranch {
    pub fn id(&self) -> BranchId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.branch.name
    }

    /// The local git branch
    pub fn branch(&self) -> &BranchRef {
        &self.branch
    }

    pub fn tip(&self) -> &CommitHash {
        self.branch.tip()
    }

    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    /// Children in layout order
    pub fn children(&self) -> &[BranchId] {
        &self.children
    }

    /// Remote-tracking branch, if one was found
    pub fn remote_tracking(&self) -> Option<&BranchRef> {
        self.remote_tracking.as_ref()
    }

    pub fn sync_to_remote(&self) -> &SyncToRemoteStatus {
        &self.sync_to_remote
    }

    /// Commits between the fork point (exclusive) and the tip, newest first
    ///
    /// Empty for roots and for branches without a fork point.
    pub fn commits(&self) -> &[CommitRef] {
        &self.commits
    }

    pub fn kind(&self) -> &BranchKind {
        &self.kind
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, BranchKind::Root)
    }

    pub fn parent(&self) -> Option<BranchId> {
        self.non_root_info().map(|info| info.parent)
    }

    pub fn fork_point(&self) -> Option<&ForkPoint> {
        self.non_root_info().and_then(|info| info.fork_point.as_ref())
    }

    /// Relation to the parent; `None` for roots
    pub fn sync_to_parent(&self) -> Option<SyncToParentStatus> {
        self.non_root_info().map(|info| info.sync_to_parent)
    }

    pub(super) fn non_root_info(&self) -> Option<&NonRootInfo> {
        match &self.kind {
            BranchKind::Root => None,
            BranchKind::NonRoot(info) => Some(info),
        }
    }
}

/// A non-root branch together with its parent
#[derive(Debug, Clone, Copy)]
pub struct NonRootBranch<'a> {
    pub(super) branch: &'a ManagedBranch,
    pub(super) info: &'a NonRootInfo,
    pub(super) parent: &'a ManagedBranch,
}

impl<'a> NonRootBranch<'a> {
    pub fn managed(&self) -> &'a ManagedBranch {
        self.branch
    }

    pub fn name(&self) -> &'a str {
        self.branch.name()
    }

    pub fn parent(&self) -> &'a ManagedBranch {
        self.parent
    }

    pub fn fork_point(&self) -> Option<&'a ForkPoint> {
        self.info.fork_point.as_ref()
    }

    pub fn sync_to_parent(&self) -> SyncToParentStatus {
        self.info.sync_to_parent
    }

    /// Arguments for rebasing this branch onto the current tip of its parent
    pub fn parameters_for_rebase_onto_parent(&self) -> Result<RebaseParameters, MissingForkPointError> {
        let fork_point = self.fork_point().ok_or_else(|| MissingForkPointError {
            branch: self.name().to_string(),
        })?;
        Ok(RebaseParameters {
            branch: self.branch.branch.clone(),
            new_base: self.parent.branch.commit.clone(),
            fork_point: fork_point.commit.clone(),
        })
    }

    /// Arguments for merging the parent into this branch
    pub fn parameters_for_merge_into_parent(&self) -> MergeParameters {
        MergeParameters {
            branch: self.branch.branch.clone(),
            parent: self.parent.branch.clone(),
        }
    }
}

/// Three-way rebase of a branch onto its parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebaseParameters {
    /// Branch being rebased
    pub branch: BranchRef,
    /// Parent tip the commits are replayed onto
    pub new_base: CommitRef,
    /// Commits after this one are replayed
    pub fork_point: CommitRef,
}

impl RebaseParameters {
    /// `git` arguments performing the rebase
    pub fn git_args(&self) -> Vec<String> {
        vec![
            "rebase".to_string(),
            "--onto".to_string(),
            self.new_base.hash.to_string(),
            self.fork_point.hash.to_string(),
            self.branch.name.clone(),
        ]
    }
}

/// Merge of a parent into its child
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeParameters {
    /// Branch receiving the merge
    pub branch: BranchRef,
    /// Branch being merged in
    pub parent: BranchRef,
}

impl MergeParameters {
    /// `git` arguments performing the merge, to be run with `branch` checked out
    pub fn git_args(&self) -> Vec<String> {
        vec!["merge".to_string(), self.parent.name.clone()]
    }
}
