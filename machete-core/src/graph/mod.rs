//! Branch graph layout
//!
//! Flattens a snapshot forest into rows with sibling links and passing
//! connector columns, ready for a renderer to paint.

mod layout;
mod render;

pub use layout::{GraphEdge, GraphItem, GraphLayout, GraphOptions, GraphRow, VisibleEdge};
pub use render::render;
