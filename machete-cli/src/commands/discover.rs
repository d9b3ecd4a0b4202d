//! Discover command - derive a layout from branch ancestry

use clap::Args;
use machete_core::discover_layout;
use machete_core::layout::serialize_layout;

use super::Context;

/// Guess a layout from the local branches
#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Save the discovered layout to the layout file
    #[arg(short, long)]
    pub write: bool,
}

impl DiscoverArgs {
    /// Execute the discover command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let ctx_blocking = ctx.clone();
        let layout = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
            let repo = ctx_blocking.open_repo()?;
            let layout = discover_layout(&repo, &ctx_blocking.config().discover)?;
            Ok(layout.with_format(ctx_blocking.config().layout.format()))
        })
        .await??;

        if layout.is_empty() {
            println!("No local branches found.");
            return Ok(());
        }

        print!("{}", serialize_layout(&layout));

        if self.write {
            let repo = ctx.open_repo()?;
            ctx.write_layout(&repo, &layout)?;
            println!();
            println!("Layout saved to {}", ctx.layout_file(&repo).path().display());
        }

        Ok(())
    }
}
