//! Layout editing commands: add, slide-out, rename, anno

use anyhow::bail;
use clap::Args;
use machete_core::{GitQuery, GitRepo};

use super::Context;

/// Add a branch to the layout
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Branch to add (must exist locally)
    pub branch: String,

    /// Parent branch (defaults to the current branch when it is in the layout)
    #[arg(short, long)]
    pub onto: Option<String>,

    /// Add as a new root instead of under a parent
    #[arg(long, conflicts_with = "onto")]
    pub as_root: bool,

    /// Annotation written after the branch name
    #[arg(short, long)]
    pub annotation: Option<String>,
}

impl AddArgs {
    /// Execute the add command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let repo = ctx.open_repo()?;
        ensure_local_branch(&repo, &self.branch)?;
        let layout = ctx.read_layout(&repo)?;

        let parent = if self.as_root {
            None
        } else if let Some(onto) = &self.onto {
            Some(onto.clone())
        } else {
            repo.current_branch()?
                .filter(|current| current != &self.branch && layout.contains(current))
        };

        let updated = layout.add_child(parent.as_deref(), &self.branch, self.annotation.as_deref())?;
        ctx.write_layout(&repo, &updated)?;

        match parent {
            Some(parent) => println!("Added {} onto {}", self.branch, parent),
            None => println!("Added {} as a root branch", self.branch),
        }
        Ok(())
    }
}

/// Remove a branch from the layout, moving its children up to its parent
#[derive(Args, Debug)]
pub struct SlideOutArgs {
    /// Branch to slide out
    pub branch: String,
}

impl SlideOutArgs {
    /// Execute the slide-out command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let repo = ctx.open_repo()?;
        let layout = ctx.read_layout(&repo)?;
        let updated = layout.slide_out(&self.branch)?;
        ctx.write_layout(&repo, &updated)?;
        println!("Slid out {}", self.branch);
        Ok(())
    }
}

/// Rename a branch in the layout
#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Current name in the layout
    pub from: String,

    /// New name
    pub to: String,
}

impl RenameArgs {
    /// Execute the rename command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let repo = ctx.open_repo()?;
        let layout = ctx.read_layout(&repo)?;
        let updated = layout.rename(&self.from, &self.to)?;
        ctx.write_layout(&repo, &updated)?;
        println!("Renamed {} to {}", self.from, self.to);
        Ok(())
    }
}

/// Show or change the annotation of a branch
#[derive(Args, Debug)]
pub struct AnnoArgs {
    /// Branch to annotate
    pub branch: String,

    /// New annotation; prints the current one when omitted
    pub text: Vec<String>,

    /// Remove the annotation
    #[arg(long, conflicts_with = "text")]
    pub clear: bool,
}

impl AnnoArgs {
    /// Execute the anno command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let repo = ctx.open_repo()?;
        let layout = ctx.read_layout(&repo)?;

        if !self.clear && self.text.is_empty() {
            let Some(entry) = layout.find(&self.branch) else {
                bail!("branch '{}' is not in the layout", self.branch);
            };
            if let Some(annotation) = &entry.annotation {
                println!("{}", annotation);
            }
            return Ok(());
        }

        let text = self.text.join(" ");
        let annotation = if self.clear { None } else { Some(text.as_str()) };
        let updated = layout.set_annotation(&self.branch, annotation)?;
        ctx.write_layout(&repo, &updated)?;
        Ok(())
    }
}

fn ensure_local_branch(repo: &GitRepo, name: &str) -> anyhow::Result<()> {
    if !repo.list_local_branches()?.iter().any(|b| b.name == name) {
        bail!("branch '{}' does not exist locally", name);
    }
    Ok(())
}
