//! CLI command implementations

pub mod context;
pub mod discover;
pub mod layout;
pub mod params;
pub mod status;

pub use context::Context;
pub use discover::DiscoverArgs;
pub use layout::{AddArgs, AnnoArgs, RenameArgs, SlideOutArgs};
pub use params::BranchArgs;
pub use status::StatusArgs;
