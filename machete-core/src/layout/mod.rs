//! Branch layout: the user-declared tree of branches
//!
//! A layout is an ordered forest of branch names with optional free-text
//! annotations, persisted as an indentation-based text file. All mutations
//! are pure and return a new layout.

mod entry;
mod file;
mod format;

pub use entry::{BranchLayout, LayoutEntry};
pub use file::BranchLayoutFile;
pub use format::{parse_layout, parse_layout_or, parse_layout_with, serialize_layout, LayoutFormat};
