//! Derive a layout from the local branches of a repository

use std::collections::HashMap;

use crate::config::DiscoverConfig;
use crate::git::{BranchRef, GitQuery, QueryResult};
use crate::layout::{BranchLayout, LayoutEntry, LayoutFormat};

/// Guess a layout from branch ancestry
///
/// The first root candidate present becomes the root. Every other branch is
/// placed under the branch whose tip is its nearest strict ancestor; branches
/// with no such ancestor go under the root, or become roots themselves when
/// no candidate exists. Siblings are ordered by name.
pub fn discover_layout<G: GitQuery + ?Sized>(
    git: &G,
    config: &DiscoverConfig,
) -> QueryResult<BranchLayout> {
    let mut locals = git.list_local_branches()?;
    locals.sort_by(|a, b| a.name.cmp(&b.name));

    let root = config
        .root_candidates
        .iter()
        .find(|candidate| locals.iter().any(|b| &b.name == *candidate))
        .cloned();

    let mut parents: HashMap<String, Option<String>> = HashMap::new();
    for branch in &locals {
        if Some(&branch.name) == root.as_ref() {
            parents.insert(branch.name.clone(), None);
            continue;
        }
        let parent = nearest_ancestor(git, branch, &locals, root.as_deref())?
            .or_else(|| root.clone());
        tracing::debug!(branch = %branch.name, parent = ?parent, "Discovered parent");
        parents.insert(branch.name.clone(), parent);
    }

    let roots = locals
        .iter()
        .filter(|b| matches!(parents.get(&b.name), Some(None)))
        .map(|b| entry_with_children(&b.name, &locals, &parents))
        .collect();

    tracing::info!(branches = locals.len(), root = ?root, "Discovered layout");
    Ok(BranchLayout::from_parts(roots, LayoutFormat::default()))
}

/// Local branch whose tip is the closest strict ancestor of `branch`'s tip
///
/// A branch sharing the tip only qualifies when it is the root.
fn nearest_ancestor<G: GitQuery + ?Sized>(
    git: &G,
    branch: &BranchRef,
    locals: &[BranchRef],
    root: Option<&str>,
) -> QueryResult<Option<String>> {
    let mut best: Option<&BranchRef> = None;
    for other in locals {
        if other.name == branch.name {
            continue;
        }
        let same_tip = other.tip() == branch.tip();
        if same_tip && Some(other.name.as_str()) != root {
            continue;
        }
        if !same_tip && !git.is_ancestor(other.tip(), branch.tip())? {
            continue;
        }
        let closer = match best {
            None => true,
            Some(current) if current.tip() == other.tip() => Some(other.name.as_str()) == root,
            Some(current) => git.is_ancestor(current.tip(), other.tip())?,
        };
        if closer {
            best = Some(other);
        }
    }
    Ok(best.map(|b| b.name.clone()))
}

fn entry_with_children(
    name: &str,
    locals: &[BranchRef],
    parents: &HashMap<String, Option<String>>,
) -> LayoutEntry {
    let children = locals
        .iter()
        .filter(|b| matches!(parents.get(&b.name), Some(Some(parent)) if parent == name))
        .map(|b| entry_with_children(&b.name, locals, parents))
        .collect();
    LayoutEntry::new(name).with_children(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::fixture::FakeRepo;
    use crate::layout::serialize_layout;

    fn discover(git: &FakeRepo) -> String {
        serialize_layout(&discover_layout(git, &DiscoverConfig::default()).unwrap())
    }

    #[test]
    fn test_stack_follows_ancestry() {
        let git = FakeRepo::new()
            .commit("m1", &[])
            .commit("d1", &["m1"])
            .commit("f1", &["d1"])
            .commit("g1", &["d1"])
            .branch("main", "m1")
            .branch("develop", "d1")
            .branch("feature-b", "g1")
            .branch("feature-a", "f1");

        assert_eq!(
            discover(&git),
            "main\n  develop\n    feature-a\n    feature-b\n"
        );
    }

    #[test]
    fn test_branch_at_root_tip_goes_under_root() {
        let git = FakeRepo::new()
            .commit("m1", &[])
            .branch("main", "m1")
            .branch("fresh", "m1");

        assert_eq!(discover(&git), "main\n  fresh\n");
    }

    #[test]
    fn test_unrelated_branch_goes_under_root() {
        let git = FakeRepo::new()
            .commit("m1", &[])
            .commit("z1", &[])
            .branch("master", "m1")
            .branch("orphan", "z1");

        assert_eq!(discover(&git), "master\n  orphan\n");
    }

    #[test]
    fn test_without_root_candidate_unrelated_branches_are_roots() {
        let git = FakeRepo::new()
            .commit("a1", &[])
            .commit("a2", &["a1"])
            .commit("z1", &[])
            .branch("alpha", "a1")
            .branch("beta", "a2")
            .branch("zeta", "z1");

        assert_eq!(discover(&git), "alpha\n  beta\nzeta\n");
    }

    #[test]
    fn test_branches_sharing_a_tip_do_not_nest() {
        let git = FakeRepo::new()
            .commit("m1", &[])
            .commit("x1", &["m1"])
            .branch("main", "m1")
            .branch("one", "x1")
            .branch("two", "x1");

        assert_eq!(discover(&git), "main\n  one\n  two\n");
    }

    #[test]
    fn test_candidate_order_picks_root() {
        let git = FakeRepo::new()
            .commit("m1", &[])
            .commit("d1", &["m1"])
            .branch("develop", "d1")
            .branch("master", "m1");
        let config = DiscoverConfig {
            root_candidates: vec!["develop".to_string(), "master".to_string()],
        };

        let layout = discover_layout(&git, &config).unwrap();
        assert_eq!(serialize_layout(&layout), "develop\n  master\n");
    }
}
