//! Shared repository access for commands

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use machete_core::{
    build_snapshot, BranchLayout, BranchLayoutFile, Config, GitRepo, RepositorySnapshot,
    SnapshotSlot,
};

/// The repository a command runs against, plus effective configuration
#[derive(Debug, Clone)]
pub struct Context {
    repo_path: PathBuf,
    config: Config,
    verbose: bool,
}

impl Context {
    pub fn new(repo_path: Option<PathBuf>, config: Config, verbose: bool) -> anyhow::Result<Self> {
        let repo_path = match repo_path {
            Some(path) => path,
            None => std::env::current_dir()?,
        };
        Ok(Self {
            repo_path,
            config,
            verbose,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn open_repo(&self) -> anyhow::Result<GitRepo> {
        Ok(GitRepo::open(&self.repo_path)?)
    }

    pub fn layout_file(&self, repo: &GitRepo) -> BranchLayoutFile {
        repo.layout_file(&self.config.layout.file_name)
    }

    /// Read the layout file, defaulting to the configured indentation when it has none
    pub fn read_layout(&self, repo: &GitRepo) -> anyhow::Result<BranchLayout> {
        let file = self.layout_file(repo);
        file.read_or(self.config.layout.format())
            .with_context(|| format!("Failed to read layout {}", file.path().display()))
    }

    pub fn write_layout(&self, repo: &GitRepo, layout: &BranchLayout) -> anyhow::Result<()> {
        let file = self.layout_file(repo);
        file.write(layout, self.config.layout.backup_on_write)
            .with_context(|| format!("Failed to write layout {}", file.path().display()))?;
        if self.verbose {
            println!("Updated {}", file.path().display());
        }
        Ok(())
    }

    /// Build a snapshot on the blocking pool and publish it into `slot`
    pub async fn load_snapshot(&self, slot: Arc<SnapshotSlot>) -> anyhow::Result<Arc<RepositorySnapshot>> {
        let ctx = self.clone();
        let published = Arc::clone(&slot);
        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let repo = ctx.open_repo()?;
            let layout = ctx.read_layout(&repo)?;
            let options = ctx.config.status.snapshot_options();
            published.rebuild(|| build_snapshot(&repo, &layout, &options))?;
            Ok(())
        })
        .await
        .context("Snapshot build task failed")??;

        slot.current()
            .ok_or_else(|| anyhow::anyhow!("No snapshot was published"))
    }

    /// Build a snapshot for a one-off command
    pub async fn snapshot(&self) -> anyhow::Result<Arc<RepositorySnapshot>> {
        self.load_snapshot(Arc::new(SnapshotSlot::new())).await
    }
}
