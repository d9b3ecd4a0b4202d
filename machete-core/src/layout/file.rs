//! Reading and writing the layout file

use std::fs;
use std::path::{Path, PathBuf};

use super::entry::BranchLayout;
use super::format::{parse_layout_or, serialize_layout, LayoutFormat};
use crate::Result;

/// The persisted layout, by default `<git-dir>/machete`
#[derive(Debug, Clone)]
pub struct BranchLayoutFile {
    path: PathBuf,
}

impl BranchLayoutFile {
    /// Layout file at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the layout file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path the previous content is copied to on a backed-up write
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push("~");
        self.path.with_file_name(name)
    }

    /// Whether the file exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read and parse the layout; a missing file is an empty layout
    pub fn read(&self) -> Result<BranchLayout> {
        self.read_or(LayoutFormat::default())
    }

    /// Read the layout, using `fallback` for indentation the file does not show
    pub fn read_or(&self, fallback: LayoutFormat) -> Result<BranchLayout> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No layout file, using empty layout");
            return Ok(BranchLayout::default().with_format(fallback));
        }

        let contents = fs::read_to_string(&self.path)?;
        Ok(parse_layout_or(&contents, fallback)?)
    }

    /// Write the layout, optionally copying the old file to its backup path first
    pub fn write(&self, layout: &BranchLayout, backup: bool) -> Result<()> {
        if backup && self.path.exists() {
            let backup_path = self.backup_path();
            fs::copy(&self.path, &backup_path)?;
            tracing::debug!(backup = %backup_path.display(), "Backed up layout file");
        }

        fs::write(&self.path, serialize_layout(layout))?;
        tracing::info!(path = %self.path.display(), "Wrote layout file");
        Ok(())
    }
}
