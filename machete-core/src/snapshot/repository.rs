//! Immutable view of the layout bound to repository state

use std::collections::HashMap;

use serde::Serialize;

use super::branch::{BranchId, ManagedBranch, NonRootBranch};
use crate::layout::BranchLayout;

/// Layout entries bound to git branches, with fork points and statuses
///
/// Branches are stored in layout pre-order; a [`BranchId`] is an index into
/// that order and is only meaningful for the snapshot that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySnapshot {
    branches: Vec<ManagedBranch>,
    roots: Vec<BranchId>,
    #[serde(skip)]
    by_name: HashMap<String, BranchId>,
    current: Option<BranchId>,
    #[serde(skip)]
    layout: BranchLayout,
}

impl RepositorySnapshot {
    pub(super) fn new(
        branches: Vec<ManagedBranch>,
        roots: Vec<BranchId>,
        current: Option<BranchId>,
        layout: BranchLayout,
    ) -> Self {
        let by_name = branches
            .iter()
            .map(|b| (b.name().to_string(), b.id()))
            .collect();
        Self {
            branches,
            roots,
            by_name,
            current,
            layout,
        }
    }

    /// All branches in pre-order
    pub fn branches(&self) -> &[ManagedBranch] {
        &self.branches
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Top-level branches in layout order
    pub fn root_branches(&self) -> impl Iterator<Item = &ManagedBranch> + '_ {
        self.roots.iter().map(|id| self.branch(*id))
    }

    /// Branch by id
    ///
    /// # Panics
    ///
    /// Panics if `id` was produced by a different snapshot with more branches.
    pub fn branch(&self, id: BranchId) -> &ManagedBranch {
        &self.branches[id.0]
    }

    pub fn branch_by_name(&self, name: &str) -> Option<&ManagedBranch> {
        self.by_name.get(name).map(|id| self.branch(*id))
    }

    /// The checked-out branch, if it is part of the layout
    pub fn current_branch_if_managed(&self) -> Option<&ManagedBranch> {
        self.current.map(|id| self.branch(id))
    }

    pub fn parent_of(&self, id: BranchId) -> Option<&ManagedBranch> {
        self.branch(id).parent().map(|parent| self.branch(parent))
    }

    pub fn children_of(&self, id: BranchId) -> impl Iterator<Item = &ManagedBranch> + '_ {
        self.branch(id).children().iter().map(|child| self.branch(*child))
    }

    /// Non-root view of a branch; `None` for roots and unknown names
    pub fn non_root_branch(&self, name: &str) -> Option<NonRootBranch<'_>> {
        let branch = self.branch_by_name(name)?;
        let info = branch.non_root_info()?;
        Some(NonRootBranch {
            branch,
            info,
            parent: self.branch(info.parent),
        })
    }

    /// Number of layout levels above `id`
    pub fn depth_of(&self, id: BranchId) -> usize {
        let mut depth = 0;
        let mut cursor = self.branch(id).parent();
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.branch(parent).parent();
        }
        depth
    }

    /// The layout this snapshot was built from
    pub fn layout(&self) -> &BranchLayout {
        &self.layout
    }
}
