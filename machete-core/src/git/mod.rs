//! Git access for machete
//!
//! This module provides the read-only query interface the snapshot is built
//! from, its `git2` implementation, and repository detection.

mod branch;
#[cfg(test)]
pub(crate) mod fixture;
mod query;
mod repo;
mod types;

pub use query::{GitQuery, QueryResult};
pub use repo::GitRepo;
pub use types::{BranchLocation, BranchRef, CommitHash, CommitRef, ReflogEntry};
