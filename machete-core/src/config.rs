//! Configuration management for machete
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (MACHETE_*)
//! 3. Config file (~/.config/machete/config.toml)
//! 4. Default values

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::layout::LayoutFormat;
use crate::snapshot::SnapshotOptions;
use crate::{Error, Result};

/// Layout file configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// File name of the layout, relative to the git directory
    pub file_name: String,

    /// Indent character for layouts without detected indentation
    pub indent_char: char,

    /// Indent characters per level for layouts without detected indentation
    pub indent_width: usize,

    /// Copy the previous layout to `<file>~` before overwriting it
    pub backup_on_write: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            file_name: "machete".to_string(),
            indent_char: ' ',
            indent_width: 2,
            backup_on_write: true,
        }
    }
}

impl LayoutConfig {
    /// Indentation to write with when a layout has none of its own
    pub fn format(&self) -> LayoutFormat {
        LayoutFormat::new(self.indent_char, self.indent_width)
    }
}

/// Status output configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Show commits between each fork point and branch tip
    pub list_commits: bool,

    /// Cap on commits listed per branch
    pub max_commits_per_branch: usize,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            list_commits: false,
            max_commits_per_branch: SnapshotOptions::default().max_commits_per_branch,
        }
    }
}

impl StatusConfig {
    /// Snapshot options derived from this section
    pub fn snapshot_options(&self) -> SnapshotOptions {
        SnapshotOptions {
            max_commits_per_branch: self.max_commits_per_branch,
        }
    }
}

/// Layout discovery configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoverConfig {
    /// Branch names tried in order; the first one present becomes the root
    pub root_candidates: Vec<String>,
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        Self {
            root_candidates: vec![
                "main".to_string(),
                "master".to_string(),
                "develop".to_string(),
            ],
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Layout file configuration
    pub layout: LayoutConfig,

    /// Status configuration
    pub status: StatusConfig,

    /// Discover configuration
    pub discover: DiscoverConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/machete/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("machete").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - MACHETE_LAYOUT_FILE: Layout file name
    /// - MACHETE_LIST_COMMITS: `true`/`1` to list commits in status
    /// - MACHETE_ROOT_CANDIDATES: Comma-separated root candidates
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(file_name) = var("MACHETE_LAYOUT_FILE") {
            self.layout.file_name = file_name;
        }

        if let Some(list) = var("MACHETE_LIST_COMMITS") {
            self.status.list_commits = matches!(list.as_str(), "1" | "true" | "yes");
        }

        if let Some(candidates) = var("MACHETE_ROOT_CANDIDATES") {
            self.discover.root_candidates = candidates
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, layout_file: Option<String>, list_commits: bool) -> Self {
        if let Some(file_name) = layout_file {
            self.layout.file_name = file_name;
        }

        if list_commits {
            self.status.list_commits = true;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(layout_file: Option<String>, list_commits: bool) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(layout_file, list_commits))
    }
}
