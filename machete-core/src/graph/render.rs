//! Plain-text rendering of a graph layout

use super::layout::{GraphItem, GraphLayout, GraphRow};
use crate::snapshot::{Relation, RepositorySnapshot, SyncToParentStatus};

/// Render every row of `graph` as one line of text
///
/// Rows must come from a layout built from `snapshot`.
pub fn render(graph: &GraphLayout, snapshot: &RepositorySnapshot) -> String {
    let current = snapshot.current_branch_if_managed().map(|b| b.id());
    let mut out = String::new();
    for row in graph.rows() {
        out.push_str(&connectors(row));
        match &row.item {
            GraphItem::Commit { commit, .. } => {
                out.push_str("| ");
                out.push_str(&commit.summary);
            }
            GraphItem::Branch { branch, name } => {
                let managed = snapshot.branch(*branch);
                if row.node_position().is_some() {
                    out.push_str("o-");
                }
                out.push_str(name);
                if let Some(annotation) = managed.annotation() {
                    out.push(' ');
                    out.push_str(annotation);
                }
                if let Some(status) = managed.sync_to_parent() {
                    if status != SyncToParentStatus::InSync {
                        out.push_str(&format!(" [{}]", status));
                    }
                }
                if managed.fork_point().is_some_and(|fp| fp.is_ambiguous()) {
                    out.push_str(" [ambiguous fork point]");
                }
                let remote = managed.sync_to_remote();
                if !matches!(remote.relation, Relation::NoRemotes | Relation::InSyncToRemote) {
                    out.push_str(&format!(" ({})", remote));
                }
                if current == Some(*branch) {
                    out.push_str(" *");
                }
            }
        }
        out.push('\n');
    }
    out
}

/// Columns left of the row's node: `| ` where a connector passes, blanks elsewhere
fn connectors(row: &GraphRow) -> String {
    let width = row.node_position().unwrap_or(0);
    (0..width)
        .map(|column| {
            if row.passing_positions.contains(&column) {
                "| "
            } else {
                "  "
            }
        })
        .collect()
}
