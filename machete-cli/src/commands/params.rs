//! Fork point and rebase/merge parameter commands

use anyhow::anyhow;
use clap::Args;
use machete_core::snapshot::{ForkPointSource, NonRootBranch};
use machete_core::RepositorySnapshot;

use super::Context;

/// Arguments naming one non-root branch
#[derive(Args, Debug)]
pub struct BranchArgs {
    /// Branch in the layout (defaults to the current branch)
    pub branch: Option<String>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

impl BranchArgs {
    fn resolve<'a>(&self, snapshot: &'a RepositorySnapshot) -> anyhow::Result<NonRootBranch<'a>> {
        let name = match &self.branch {
            Some(name) => name.as_str(),
            None => snapshot
                .current_branch_if_managed()
                .map(|b| b.name())
                .ok_or_else(|| anyhow!("current branch is not in the layout"))?,
        };
        if snapshot.branch_by_name(name).is_none() {
            return Err(anyhow!("branch '{}' is not in the layout", name));
        }
        snapshot
            .non_root_branch(name)
            .ok_or_else(|| anyhow!("branch '{}' is a root and has no parent", name))
    }

    /// Print the fork point of a branch
    pub async fn fork_point(&self, ctx: &Context) -> anyhow::Result<()> {
        let snapshot = ctx.snapshot().await?;
        let branch = self.resolve(&snapshot)?;

        let Some(fork_point) = branch.fork_point() else {
            return Err(anyhow!("cannot find fork point for branch '{}'", branch.name()));
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(fork_point)?);
            return Ok(());
        }

        println!("{}", fork_point.commit.hash);
        if ctx.verbose() {
            let source = match fork_point.source {
                ForkPointSource::Reflog => "reflog",
                ForkPointSource::MergeBase => "merge-base",
            };
            println!("  {} (from {})", fork_point.commit.summary, source);
        }
        if let Some(alternative) = &fork_point.alternative {
            eprintln!(
                "warning: merge-base {} with {} is newer; check the fork point manually",
                alternative.hash.short(),
                branch.parent().name()
            );
        }
        Ok(())
    }

    /// Print the rebase of a branch onto its parent
    pub async fn rebase_params(&self, ctx: &Context) -> anyhow::Result<()> {
        let snapshot = ctx.snapshot().await?;
        let params = self.resolve(&snapshot)?.parameters_for_rebase_onto_parent()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&params)?);
        } else {
            println!("git {}", params.git_args().join(" "));
        }
        Ok(())
    }

    /// Print the merge of a branch's parent into it
    pub async fn merge_params(&self, ctx: &Context) -> anyhow::Result<()> {
        let snapshot = ctx.snapshot().await?;
        let params = self.resolve(&snapshot)?.parameters_for_merge_into_parent();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&params)?);
        } else {
            println!("git checkout {}", params.branch.name);
            println!("git {}", params.git_args().join(" "));
        }
        Ok(())
    }
}
