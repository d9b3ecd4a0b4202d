//! Snapshot construction

use std::collections::{HashMap, HashSet};

use super::branch::{BranchId, BranchKind, ManagedBranch, NonRootInfo};
use super::fork_point::resolve_fork_point;
use super::repository::RepositorySnapshot;
use super::status::{find_remote_tracking, sync_to_parent_status, sync_to_remote_status};
use crate::error::RepositoryBuildError;
use crate::git::{BranchRef, CommitHash, GitQuery};
use crate::layout::{BranchLayout, LayoutEntry};

/// Knobs for snapshot construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotOptions {
    /// Upper bound on commits listed per branch
    pub max_commits_per_branch: usize,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            max_commits_per_branch: 50,
        }
    }
}

/// A layout entry in pre-order with its parent position
struct Slot<'a> {
    entry: &'a LayoutEntry,
    parent: Option<BranchId>,
}

fn flatten<'a>(entries: &'a [LayoutEntry], parent: Option<BranchId>, out: &mut Vec<Slot<'a>>) {
    for entry in entries {
        let id = BranchId(out.len());
        out.push(Slot { entry, parent });
        flatten(&entry.children, Some(id), out);
    }
}

fn subtree_names<'a>(entry: &'a LayoutEntry, out: &mut HashSet<&'a str>) {
    out.insert(&entry.name);
    for child in &entry.children {
        subtree_names(child, out);
    }
}

/// Bind `layout` to the state of `git`
///
/// Every layout entry must name an existing local branch. Any failing git
/// query abandons the whole build.
pub fn build_snapshot<G: GitQuery + ?Sized>(
    git: &G,
    layout: &BranchLayout,
    options: &SnapshotOptions,
) -> Result<RepositorySnapshot, RepositoryBuildError> {
    let locals: HashMap<String, BranchRef> = git
        .list_local_branches()?
        .into_iter()
        .map(|b| (b.name.clone(), b))
        .collect();
    let remote_branches = git.list_remote_branches()?;
    let remotes = git.list_remotes()?;
    let current = git.current_branch()?;

    let mut slots = Vec::new();
    flatten(layout.roots(), None, &mut slots);

    let mut refs = Vec::with_capacity(slots.len());
    for slot in &slots {
        let branch = locals
            .get(&slot.entry.name)
            .ok_or_else(|| RepositoryBuildError::BranchNotFound(slot.entry.name.clone()))?;
        refs.push(branch);
    }

    let mut branches: Vec<ManagedBranch> = Vec::with_capacity(slots.len());
    for (index, slot) in slots.iter().enumerate() {
        let branch = refs[index];

        let remote_tracking = find_remote_tracking(branch, &remote_branches, &remotes).cloned();
        let sync_to_remote =
            sync_to_remote_status(git, branch, remote_tracking.as_ref(), !remotes.is_empty())?;

        let (kind, commits) = match slot.parent {
            None => (BranchKind::Root, Vec::new()),
            Some(parent_id) => {
                let parent = refs[parent_id.0];

                let mut excluded = HashSet::new();
                subtree_names(slot.entry, &mut excluded);
                excluded.insert(parent.name.as_str());
                let other_tips: Vec<CommitHash> = locals
                    .values()
                    .filter(|b| !excluded.contains(b.name.as_str()))
                    .map(|b| b.tip().clone())
                    .collect();

                let fork_point = resolve_fork_point(git, branch, parent, &other_tips)?;
                let sync_to_parent = sync_to_parent_status(
                    git,
                    branch.tip(),
                    parent.tip(),
                    fork_point.as_ref().map(|fp| &fp.commit.hash),
                )?;
                let commits = match &fork_point {
                    Some(fp) => {
                        git.commits_between(branch.tip(), &fp.commit.hash, options.max_commits_per_branch)?
                    }
                    None => Vec::new(),
                };

                tracing::debug!(
                    branch = %branch.name,
                    parent = %parent.name,
                    status = %sync_to_parent,
                    commits = commits.len(),
                    "Bound non-root branch"
                );
                let info = NonRootInfo {
                    parent: parent_id,
                    fork_point,
                    sync_to_parent,
                };
                (BranchKind::NonRoot(info), commits)
            }
        };

        branches.push(ManagedBranch {
            id: BranchId(index),
            branch: branch.clone(),
            annotation: slot.entry.annotation.clone(),
            children: Vec::new(),
            remote_tracking,
            sync_to_remote,
            commits,
            kind,
        });
    }

    let mut roots = Vec::new();
    for (index, slot) in slots.iter().enumerate() {
        match slot.parent {
            Some(parent) => branches[parent.0].children.push(BranchId(index)),
            None => roots.push(BranchId(index)),
        }
    }

    let current = current.and_then(|name| {
        branches
            .iter()
            .find(|b| b.name() == name)
            .map(ManagedBranch::id)
    });

    tracing::info!(
        branches = branches.len(),
        roots = roots.len(),
        current = ?current.map(|id| branches[id.0].name().to_string()),
        "Built repository snapshot"
    );
    Ok(RepositorySnapshot::new(branches, roots, current, layout.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MissingForkPointError;
    use crate::git::fixture::{FakeRepo, TestRepo};
    use crate::git::GitRepo;
    use crate::layout::parse_layout;
    use crate::snapshot::{ForkPointSource, Relation, SyncToParentStatus};

    fn build(git: &FakeRepo, text: &str) -> Result<RepositorySnapshot, RepositoryBuildError> {
        build_snapshot(git, &parse_layout(text).unwrap(), &SnapshotOptions::default())
    }

    fn stack() -> FakeRepo {
        FakeRepo::new()
            .commit("m1", &[])
            .commit("d1", &["m1"])
            .commit("f1", &["d1"])
            .commit("f2", &["f1"])
            .branch("main", "m1")
            .branch("develop", "d1")
            .branch("feature-x", "f2")
            .reflog("develop", &[(Some("m1"), "d1")])
            .reflog("feature-x", &[(Some("f1"), "f2"), (Some("d1"), "f1")])
            .checkout("feature-x")
    }

    const STACK: &str = "main\n  develop\n    feature-x\n";

    #[test]
    fn test_descendant_with_fork_point_at_parent_tip_is_in_sync() {
        let snapshot = build(&stack(), STACK).unwrap();

        let feature = snapshot.non_root_branch("feature-x").unwrap();
        assert_eq!(feature.parent().name(), "develop");
        assert_eq!(feature.fork_point().unwrap().commit.hash, FakeRepo::hash("d1"));
        assert_eq!(feature.sync_to_parent(), SyncToParentStatus::InSync);

        let hashes: Vec<_> = feature.managed().commits().iter().map(|c| c.hash.clone()).collect();
        assert_eq!(hashes, vec![FakeRepo::hash("f2"), FakeRepo::hash("f1")]);
    }

    #[test]
    fn test_structure_and_lookups() {
        let snapshot = build(&stack(), STACK).unwrap();

        let roots: Vec<_> = snapshot.root_branches().map(|b| b.name()).collect();
        assert_eq!(roots, vec!["main"]);

        let main = snapshot.branch_by_name("main").unwrap();
        assert!(main.is_root());
        assert!(main.fork_point().is_none());
        assert!(main.sync_to_parent().is_none());

        let develop = snapshot.branch_by_name("develop").unwrap();
        let children: Vec<_> = snapshot.children_of(develop.id()).map(|b| b.name()).collect();
        assert_eq!(children, vec!["feature-x"]);
        assert_eq!(snapshot.parent_of(develop.id()).map(|b| b.name()), Some("main"));
        assert_eq!(snapshot.depth_of(snapshot.branch_by_name("feature-x").unwrap().id()), 2);

        assert_eq!(snapshot.current_branch_if_managed().map(|b| b.name()), Some("feature-x"));
        assert!(snapshot.non_root_branch("main").is_none());
        assert!(snapshot.branch_by_name("nope").is_none());
    }

    #[test]
    fn test_parent_child_links_are_consistent() {
        let git = stack()
            .commit("s1", &["m1"])
            .branch("side", "s1");
        let snapshot = build(&git, "main\n  develop\n    feature-x\n  side\n").unwrap();
        for branch in snapshot.branches() {
            for child in snapshot.children_of(branch.id()) {
                assert_eq!(child.parent(), Some(branch.id()));
            }
            if let Some(parent) = snapshot.parent_of(branch.id()) {
                assert!(parent.children().contains(&branch.id()));
            }
        }
    }

    #[test]
    fn test_missing_branch_is_an_error() {
        let err = build(&stack(), "main\n  ghost\n").unwrap_err();
        assert_eq!(err, RepositoryBuildError::BranchNotFound("ghost".to_string()));
    }

    #[test]
    fn test_unresolvable_fork_point() {
        let git = FakeRepo::new()
            .commit("a", &[])
            .commit("z", &[])
            .branch("main", "a")
            .branch("orphan", "z");
        let snapshot = build(&git, "main\n  orphan\n").unwrap();

        let orphan = snapshot.non_root_branch("orphan").unwrap();
        assert!(orphan.fork_point().is_none());
        assert!(orphan.managed().commits().is_empty());
        assert_eq!(orphan.sync_to_parent(), SyncToParentStatus::OutOfSync);
        assert_eq!(
            orphan.parameters_for_rebase_onto_parent().unwrap_err(),
            MissingForkPointError {
                branch: "orphan".to_string()
            }
        );

        let merge = orphan.parameters_for_merge_into_parent();
        assert_eq!(merge.parent.name, "main");
        assert_eq!(merge.git_args(), vec!["merge", "main"]);
    }

    #[test]
    fn test_rebase_parameters() {
        let git = FakeRepo::new()
            .commit("m1", &[])
            .commit("d1", &["m1"])
            .commit("f1", &["d1"])
            .commit("d2", &["d1"])
            .branch("main", "m1")
            .branch("develop", "d2")
            .branch("feature-x", "f1")
            .reflog("feature-x", &[(Some("d1"), "f1")]);
        let snapshot = build(&git, STACK).unwrap();

        let feature = snapshot.non_root_branch("feature-x").unwrap();
        assert_eq!(feature.sync_to_parent(), SyncToParentStatus::OutOfSync);
        let params = feature.parameters_for_rebase_onto_parent().unwrap();
        assert_eq!(params.new_base.hash, FakeRepo::hash("d2"));
        assert_eq!(params.fork_point.hash, FakeRepo::hash("d1"));
        assert_eq!(params.git_args(), vec!["rebase", "--onto", "d2", "d1", "feature-x"]);
    }

    #[test]
    fn test_rebuild_is_value_equal() {
        let git = stack();
        assert_eq!(build(&git, STACK).unwrap(), build(&git, STACK).unwrap());
    }

    #[test]
    fn test_reflog_failure_fails_the_build() {
        let git = stack().fail_reflog_of("feature-x");
        assert!(matches!(build(&git, STACK), Err(RepositoryBuildError::Git(_))));
    }

    #[test]
    fn test_every_branch_has_statuses() {
        let git = stack()
            .remote("origin")
            .remote_branch("origin", "main", "m1")
            .remote_branch("origin", "develop", "m1");
        let snapshot = build(&git, STACK).unwrap();

        for branch in snapshot.branches() {
            assert_eq!(branch.is_root(), branch.sync_to_parent().is_none());
        }
        let relation = |name: &str| snapshot.branch_by_name(name).unwrap().sync_to_remote().relation;
        assert_eq!(relation("main"), Relation::InSyncToRemote);
        assert_eq!(relation("develop"), Relation::AheadOfRemote);
        assert_eq!(relation("feature-x"), Relation::Untracked);
    }

    #[test]
    fn test_commit_listing_is_capped() {
        let git = stack();
        let options = SnapshotOptions {
            max_commits_per_branch: 1,
        };
        let snapshot = build_snapshot(&git, &parse_layout(STACK).unwrap(), &options).unwrap();
        assert_eq!(snapshot.branch_by_name("feature-x").unwrap().commits().len(), 1);
    }

    #[test]
    fn test_builds_against_real_repository() {
        let test = TestRepo::new();
        let m1 = test.commit("main", "init", 100);
        test.branch("develop", &m1);
        let d1 = test.commit("develop", "develop work", 200);
        test.commit("main", "hotfix", 300);
        test.checkout("develop");

        let repo = GitRepo::open(test.path()).unwrap();
        let layout = parse_layout("main\n  develop\n").unwrap();
        let snapshot = build_snapshot(&repo, &layout, &SnapshotOptions::default()).unwrap();

        let develop = snapshot.non_root_branch("develop").unwrap();
        assert_eq!(develop.managed().tip(), &d1);
        assert_eq!(develop.fork_point().unwrap().commit.hash, m1);
        assert_eq!(develop.sync_to_parent(), SyncToParentStatus::OutOfSync);
        assert!(matches!(
            develop.fork_point().unwrap().source,
            ForkPointSource::Reflog | ForkPointSource::MergeBase
        ));
        assert_eq!(develop.managed().sync_to_remote().relation, Relation::NoRemotes);
        assert_eq!(snapshot.current_branch_if_managed().map(|b| b.name()), Some("develop"));
    }

    #[test]
    fn test_rebased_branch_forks_at_new_base() {
        let test = TestRepo::new();
        let m1 = test.commit("main", "init", 100);
        test.branch("feature", &m1);
        test.commit("feature", "feature work", 200);
        let m2 = test.commit("main", "main work", 300);

        // rebase feature onto m2
        test.reset("feature", &m2);
        test.commit("feature", "feature work", 400);

        let repo = GitRepo::open(test.path()).unwrap();
        let layout = parse_layout("main\n  feature\n").unwrap();
        let snapshot = build_snapshot(&repo, &layout, &SnapshotOptions::default()).unwrap();

        let feature = snapshot.non_root_branch("feature").unwrap();
        assert_eq!(feature.fork_point().unwrap().commit.hash, m2);
        assert_eq!(feature.sync_to_parent(), SyncToParentStatus::InSync);
        assert_eq!(feature.managed().commits().len(), 1);
    }
}
