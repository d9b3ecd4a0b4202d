//! Machete Core - branch layout model for stacked git branches
//!
//! This crate binds a user-declared tree of branches to the commit graph of a
//! repository, derives fork points and sync statuses for every branch, and
//! lays the tree out as rows for rendering.

pub mod config;
pub mod discover;
pub mod error;
pub mod git;
pub mod graph;
pub mod layout;
pub mod snapshot;

pub use config::Config;
pub use discover::discover_layout;
pub use error::{
    Error, FormatError, GitQueryError, LayoutError, MissingForkPointError, RepositoryBuildError,
    Result,
};
pub use git::{BranchRef, CommitHash, CommitRef, GitQuery, GitRepo};
pub use graph::{GraphLayout, GraphOptions};
pub use layout::{BranchLayout, BranchLayoutFile, LayoutEntry, LayoutFormat};
pub use snapshot::{build_snapshot, RepositorySnapshot, SnapshotOptions, SnapshotSlot};
