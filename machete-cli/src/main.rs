//! Machete CLI - Command line interface for machete
//!
//! Keeps a declared tree of stacked branches and shows how each branch
//! relates to its parent and its remote.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use machete_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{
    AddArgs, AnnoArgs, BranchArgs, Context, DiscoverArgs, RenameArgs, SlideOutArgs, StatusArgs,
};

/// Machete: manage a tree of stacked git branches
#[derive(Parser, Debug)]
#[command(name = "machete")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository to operate on (defaults to the current directory)
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    /// Layout file name inside the git directory (overrides config and env)
    #[arg(long, global = true, env = "MACHETE_LAYOUT_FILE")]
    layout_file: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Show the branch tree with sync statuses
    #[command(visible_alias = "s")]
    Status(StatusArgs),

    /// Derive a layout from branch ancestry
    Discover(DiscoverArgs),

    /// Add a branch to the layout
    Add(AddArgs),

    /// Remove a branch from the layout, re-attaching its children to its parent
    SlideOut(SlideOutArgs),

    /// Rename a branch in the layout
    Rename(RenameArgs),

    /// Show or set a branch annotation
    Anno(AnnoArgs),

    /// Show where a branch diverged from its parent
    ForkPoint(BranchArgs),

    /// Show the rebase of a branch onto its parent
    RebaseParams(BranchArgs),

    /// Show the merge of a branch's parent into it
    MergeParams(BranchArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Load configuration with overrides
    let list_commits = matches!(&cli.command, Some(Commands::Status(args)) if args.list_commits);
    let config = Config::load_with_overrides(cli.layout_file.clone(), list_commits)?;

    if cli.verbose {
        tracing::info!(
            layout_file = %config.layout.file_name,
            list_commits = config.status.list_commits,
            root_candidates = ?config.discover.root_candidates,
            "Configuration loaded"
        );
    }

    let ctx = Context::new(cli.repo.clone(), config.clone(), cli.verbose)?;

    match cli.command {
        Some(Commands::Version) => {
            println!("machete {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Status(args)) => {
            args.execute(&ctx).await?;
        }
        Some(Commands::Discover(args)) => {
            args.execute(&ctx).await?;
        }
        Some(Commands::Add(args)) => {
            args.execute(&ctx).await?;
        }
        Some(Commands::SlideOut(args)) => {
            args.execute(&ctx).await?;
        }
        Some(Commands::Rename(args)) => {
            args.execute(&ctx).await?;
        }
        Some(Commands::Anno(args)) => {
            args.execute(&ctx).await?;
        }
        Some(Commands::ForkPoint(args)) => {
            args.fork_point(&ctx).await?;
        }
        Some(Commands::RebaseParams(args)) => {
            args.rebase_params(&ctx).await?;
        }
        Some(Commands::MergeParams(args)) => {
            args.merge_params(&ctx).await?;
        }
        Some(Commands::Config) => {
            println!("Machete Configuration");
            println!("=====================");
            println!();
            println!("Layout Settings:");
            println!("  file_name: {}", config.layout.file_name);
            println!("  indent: {:?} x {}", config.layout.indent_char, config.layout.indent_width);
            println!("  backup_on_write: {}", config.layout.backup_on_write);
            println!();
            println!("Status Settings:");
            println!("  list_commits: {}", config.status.list_commits);
            println!("  max_commits_per_branch: {}", config.status.max_commits_per_branch);
            println!();
            println!("Discover Settings:");
            println!("  root_candidates: {}", config.discover.root_candidates.join(", "));
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("Machete - manage a tree of stacked git branches");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
