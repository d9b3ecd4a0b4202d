//! Row model of the branch forest

use serde::Serialize;

use crate::git::CommitRef;
use crate::snapshot::{BranchId, RepositorySnapshot};

/// Knobs for graph construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphOptions {
    /// Emit a row per commit between each fork point and branch tip
    pub list_commits: bool,
}

/// What a row shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphItem {
    /// A managed branch
    Branch { branch: BranchId, name: String },
    /// A commit listed above the branch it belongs to
    Commit { branch: BranchId, commit: CommitRef },
}

impl GraphItem {
    /// The branch the row belongs to
    pub fn branch(&self) -> BranchId {
        match self {
            GraphItem::Branch { branch, .. } | GraphItem::Commit { branch, .. } => *branch,
        }
    }
}

/// One printable row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphRow {
    pub item: GraphItem,
    /// Layout depth of the row's branch; roots are 0
    pub indent: usize,
    /// Row this one is linked to upward
    pub prev_sibling: Option<usize>,
    /// Row this one is linked to downward
    pub next_sibling: Option<usize>,
    /// Columns crossed by a connector that does not touch this row's node
    pub passing_positions: Vec<usize>,
}

impl GraphRow {
    /// Column of the row's node glyph; `None` for roots
    pub fn node_position(&self) -> Option<usize> {
        self.indent.checked_sub(1)
    }
}

/// A link between two rows, `up` above `down`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GraphEdge {
    pub up: usize,
    pub down: usize,
}

impl GraphEdge {
    fn new(a: usize, b: usize) -> Self {
        Self {
            up: a.min(b),
            down: a.max(b),
        }
    }
}

/// A connector passing through a row at `position`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VisibleEdge {
    #[serde(flatten)]
    pub edge: GraphEdge,
    pub position: usize,
}

/// Ordered rows of a snapshot forest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphLayout {
    rows: Vec<GraphRow>,
}

impl GraphLayout {
    /// Lay out `snapshot` in pre-order
    ///
    /// Each non-root branch forms a chain: its listed commits, oldest first,
    /// then its own row. A chain hangs off its previous sibling's row, or off
    /// the parent's row for a first child. Roots are not linked to each other.
    pub fn build(snapshot: &RepositorySnapshot, options: GraphOptions) -> Self {
        let mut rows: Vec<GraphRow> = Vec::new();
        for root in snapshot.root_branches() {
            push_branch(snapshot, root.id(), 0, None, options, &mut rows);
        }

        // links spanning more than one row pass through every row between
        let mut spans = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            if let Some(next) = row.next_sibling {
                if let Some(position) = rows[next].node_position() {
                    if next > index + 1 {
                        spans.push((index + 1..next, position));
                    }
                }
            }
        }
        for (range, position) in spans {
            for row in &mut rows[range] {
                row.passing_positions.push(position);
            }
        }
        for row in &mut rows {
            row.passing_positions.sort_unstable();
            row.passing_positions.dedup();
        }

        let carries_connector = |row: Option<&GraphRow>| matches!(row, Some(r) if !r.passing_positions.is_empty());
        assert!(
            !carries_connector(rows.first()) && !carries_connector(rows.last()),
            "first and last rows cannot carry a passing connector"
        );

        tracing::debug!(rows = rows.len(), "Built graph layout");
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[GraphRow] {
        &self.rows
    }

    pub fn row_at(&self, index: usize) -> Option<&GraphRow> {
        self.rows.get(index)
    }

    /// Links touching the node of row `index`
    pub fn adjacent_edges(&self, index: usize) -> Vec<GraphEdge> {
        let Some(row) = self.rows.get(index) else {
            return Vec::new();
        };
        let mut edges = Vec::with_capacity(2);
        if let Some(prev) = row.prev_sibling.filter(|_| index > 0) {
            edges.push(GraphEdge::new(index, prev));
        }
        if let Some(next) = row.next_sibling.filter(|_| index + 1 < self.rows.len()) {
            edges.push(GraphEdge::new(index, next));
        }
        edges
    }

    /// Connectors passing through row `index`, each spanning from the nearest
    /// row above to the nearest row below where its column is free
    pub fn visible_edges_at(&self, index: usize) -> Vec<VisibleEdge> {
        let Some(row) = self.rows.get(index) else {
            return Vec::new();
        };
        let occupied = |i: usize, position: usize| self.rows[i].passing_positions.contains(&position);

        row.passing_positions
            .iter()
            .map(|&position| {
                // first and last rows are never occupied, so both scans stop in bounds
                let mut up = index - 1;
                while occupied(up, position) {
                    up -= 1;
                }
                let mut down = index + 1;
                while occupied(down, position) {
                    down += 1;
                }
                VisibleEdge {
                    edge: GraphEdge { up, down },
                    position,
                }
            })
            .collect()
    }
}

/// Row a chain hangs off
#[derive(Debug, Clone, Copy)]
enum Anchor {
    /// The parent's branch row; the chain is its first child
    Parent(usize),
    /// The previous sibling's branch row, which links down to the chain
    Sibling(usize),
}

/// Append the rows of `id` and its subtree; returns the index of its branch row
fn push_branch(
    snapshot: &RepositorySnapshot,
    id: BranchId,
    indent: usize,
    anchor: Option<Anchor>,
    options: GraphOptions,
    rows: &mut Vec<GraphRow>,
) -> usize {
    let branch = snapshot.branch(id);
    let (mut prev, mut link_down) = match anchor {
        None => (None, false),
        Some(Anchor::Parent(row)) => (Some(row), false),
        Some(Anchor::Sibling(row)) => (Some(row), true),
    };

    if options.list_commits && indent > 0 {
        for commit in branch.commits().iter().rev() {
            let item = GraphItem::Commit {
                branch: id,
                commit: commit.clone(),
            };
            prev = Some(push_row(rows, item, indent, prev, link_down));
            link_down = true;
        }
    }

    let item = GraphItem::Branch {
        branch: id,
        name: branch.name().to_string(),
    };
    let own = push_row(rows, item, indent, prev, link_down);

    let mut anchor = Anchor::Parent(own);
    for child in branch.children() {
        let child_row = push_branch(snapshot, *child, indent + 1, Some(anchor), options, rows);
        anchor = Anchor::Sibling(child_row);
    }
    own
}

fn push_row(
    rows: &mut Vec<GraphRow>,
    item: GraphItem,
    indent: usize,
    prev: Option<usize>,
    link_down: bool,
) -> usize {
    let index = rows.len();
    if let Some(p) = prev.filter(|_| link_down) {
        rows[p].next_sibling = Some(index);
    }
    rows.push(GraphRow {
        item,
        indent,
        prev_sibling: prev,
        next_sibling: None,
        passing_positions: Vec::new(),
    });
    index
}
