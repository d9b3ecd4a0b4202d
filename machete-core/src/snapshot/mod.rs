//! Repository snapshot
//!
//! A snapshot binds every layout entry to its git branch and records, for
//! each non-root branch, its fork point and how it relates to its parent and
//! to its remote. Snapshots are never mutated; a rebuild produces a new one
//! which is swapped into a [`SnapshotSlot`].

mod branch;
mod builder;
mod fork_point;
mod repository;
mod slot;
mod status;

pub use branch::{
    BranchId, BranchKind, ManagedBranch, MergeParameters, NonRootBranch, NonRootInfo,
    RebaseParameters,
};
pub use builder::{build_snapshot, SnapshotOptions};
pub use fork_point::{resolve_fork_point, ForkPoint, ForkPointSource};
pub use repository::RepositorySnapshot;
pub use slot::{BuildTicket, SnapshotSlot};
pub use status::{
    find_remote_tracking, sync_to_parent_status, sync_to_remote_status, Relation,
    SyncToParentStatus, SyncToRemoteStatus,
};
