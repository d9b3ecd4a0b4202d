//! Error types for machete

use thiserror::Error;

/// Result type alias for machete operations
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed layout text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Indentation jumps more than one level deeper than the previous line
    #[error("line {line}: indentation skips a level (depth {depth} after depth {previous})")]
    SkippedLevel {
        line: usize,
        depth: usize,
        previous: usize,
    },

    /// Indentation is not a multiple of the indent unit
    #[error("line {line}: indentation of {found} is not a multiple of {width}")]
    NotMultipleOfWidth {
        line: usize,
        found: usize,
        width: usize,
    },

    /// Indentation uses a character other than the detected indent character
    #[error("line {line}: indentation mixes {found:?} into {expected:?}-indented layout")]
    MixedIndentCharacter {
        line: usize,
        expected: char,
        found: char,
    },

    /// The first entry of a layout is indented
    #[error("line {line}: first entry must not be indented")]
    IndentedFirstEntry { line: usize },

    /// The same branch appears more than once
    #[error("line {line}: branch '{name}' is listed more than once")]
    DuplicateName { line: usize, name: String },
}

/// Invalid structural change to a layout
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// No entry with this name
    #[error("branch '{0}' is not in the layout")]
    UnknownBranch(String),

    /// An entry with this name already exists
    #[error("branch '{0}' is already in the layout")]
    DuplicateBranch(String),

    /// Root entries with children have nowhere to re-attach them
    #[error("cannot slide out root branch '{0}': its children have no parent to move under")]
    RootWithChildren(String),

    /// Empty name or a name containing whitespace
    #[error("invalid branch name '{0}'")]
    InvalidName(String),

    /// Annotation containing a line break
    #[error("annotation for '{0}' must be a single line")]
    MultilineAnnotation(String),
}

/// Failure reported by the git query backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("git query failed: {0}")]
pub struct GitQueryError(pub String);

impl From<git2::Error> for GitQueryError {
    fn from(err: git2::Error) -> Self {
        GitQueryError(err.message().to_string())
    }
}

/// Failure while binding a layout to repository state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryBuildError {
    /// A layout entry names a branch git does not know about
    #[error("branch '{0}' is in the layout but does not exist in the repository")]
    BranchNotFound(String),

    /// A query against git failed; the whole build is abandoned
    #[error(transparent)]
    Git(#[from] GitQueryError),
}

/// Rebase parameters were requested for a branch with no known fork point
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot get fork point for branch '{branch}'")]
pub struct MissingForkPointError {
    /// Branch the parameters were requested for
    pub branch: String,
}

/// Error type for machete operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Layout text could not be parsed
    #[error("Layout format error: {0}")]
    Format(#[from] FormatError),

    /// Layout mutation rejected
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Git query failure outside of a snapshot build
    #[error(transparent)]
    Git(#[from] GitQueryError),

    /// Snapshot build failure
    #[error("Repository error: {0}")]
    Build(#[from] RepositoryBuildError),

    /// Rebase parameters without a fork point
    #[error(transparent)]
    MissingForkPoint(#[from] MissingForkPointError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
