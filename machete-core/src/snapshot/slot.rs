//! Shared holder of the current snapshot
//!
//! Builds run outside the lock and are swapped in whole. Each build takes a
//! ticket first; a finished build is only published if no build that started
//! later has been published already.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::repository::RepositorySnapshot;

/// Permission to publish the result of one build
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BuildTicket(u64);

impl BuildTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
struct Published {
    generation: u64,
    snapshot: Option<Arc<RepositorySnapshot>>,
}

/// Atomically replaceable current snapshot
#[derive(Debug, Default)]
pub struct SnapshotSlot {
    next_generation: AtomicU64,
    published: RwLock<Published>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the start of a build
    pub fn begin_build(&self) -> BuildTicket {
        BuildTicket(self.next_generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Swap in `snapshot` unless a newer build got there first
    ///
    /// Returns whether the snapshot was published.
    pub fn publish(&self, ticket: BuildTicket, snapshot: RepositorySnapshot) -> bool {
        let mut published = self.published.write();
        if ticket.0 <= published.generation {
            tracing::warn!(
                generation = ticket.0,
                published = published.generation,
                "Dropping stale snapshot build"
            );
            return false;
        }
        published.generation = ticket.0;
        published.snapshot = Some(Arc::new(snapshot));
        tracing::debug!(generation = ticket.0, "Published snapshot");
        true
    }

    /// The latest published snapshot, if any
    pub fn current(&self) -> Option<Arc<RepositorySnapshot>> {
        self.published.read().snapshot.clone()
    }

    /// Generation of the latest published snapshot, 0 before the first publish
    pub fn generation(&self) -> u64 {
        self.published.read().generation
    }

    /// Run `build` under a fresh ticket and publish its result
    ///
    /// A failed build leaves the current snapshot in place.
    pub fn rebuild<E>(
        &self,
        build: impl FnOnce() -> Result<RepositorySnapshot, E>,
    ) -> Result<bool, E> {
        let ticket = self.begin_build();
        let snapshot = build()?;
        Ok(self.publish(ticket, snapshot))
    }
}
