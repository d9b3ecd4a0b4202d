//! Git repository detection and paths

use std::fs;
use std::path::{Path, PathBuf};

use git2::Repository;

use crate::layout::BranchLayoutFile;
use crate::{Error, Result};

/// A git repository wrapper backing [`GitQuery`](super::GitQuery) with `git2`
pub struct GitRepo {
    /// The underlying git2 repository
    repo: Repository,
    /// Path to the working tree root
    root: PathBuf,
    /// The `.git` directory shared by all worktrees
    common_dir: PathBuf,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open a git repository at the given path
    ///
    /// This will search upward from the given path to find the repository root.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::discover(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::Config(format!(
                    "Not a git repository: {}. Run 'git init' first or navigate to a git repository.",
                    path.display()
                ))
            } else {
                Error::Config(format!("Git error: {}", e))
            }
        })?;

        let root = repo
            .workdir()
            .ok_or_else(|| Error::Config("Bare repositories are not supported".to_string()))?
            .to_path_buf();

        let common_dir = common_dir(repo.path())?;

        Ok(Self {
            repo,
            root,
            common_dir,
        })
    }

    /// Get the working tree root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the `.git` directory (the common one for linked worktrees)
    pub fn git_dir(&self) -> &Path {
        &self.common_dir
    }

    /// The layout file `<git-dir>/<file_name>`
    pub fn layout_file(&self, file_name: &str) -> BranchLayoutFile {
        BranchLayoutFile::new(self.git_dir().join(file_name))
    }

    /// Get access to the underlying git2 repository
    pub fn inner(&self) -> &Repository {
        &self.repo
    }
}

/// A linked worktree's git dir names the shared one in its `commondir` file
fn common_dir(git_dir: &Path) -> Result<PathBuf> {
    let pointer = git_dir.join("commondir");
    if !pointer.is_file() {
        return Ok(git_dir.to_path_buf());
    }
    let target = PathBuf::from(fs::read_to_string(&pointer)?.trim_end());
    Ok(if target.is_absolute() {
        target
    } else {
        git_dir.join(target)
    })
}
