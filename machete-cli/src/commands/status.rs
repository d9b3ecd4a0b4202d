//! Status command - show the branch tree with sync statuses

use clap::Args;
use machete_core::graph::{render, GraphRow, VisibleEdge};
use machete_core::{GraphLayout, GraphOptions, RepositorySnapshot};
use serde::Serialize;

use super::Context;

/// Show the layout bound to the repository
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// List commits between each branch's fork point and tip
    #[arg(short = 'l', long)]
    pub list_commits: bool,

    /// Print the snapshot and graph rows as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    snapshot: &'a RepositorySnapshot,
    rows: Vec<RowReport<'a>>,
}

#[derive(Serialize)]
struct RowReport<'a> {
    #[serde(flatten)]
    row: &'a GraphRow,
    visible_edges: Vec<VisibleEdge>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let snapshot = ctx.snapshot().await?;

        if snapshot.is_empty() {
            println!("No branches in the layout. Try `machete discover` or `machete add`.");
            return Ok(());
        }

        let options = GraphOptions {
            list_commits: ctx.config().status.list_commits,
        };
        let graph = GraphLayout::build(&snapshot, options);

        if self.json {
            let rows = graph
                .rows()
                .iter()
                .enumerate()
                .map(|(index, row)| RowReport {
                    row,
                    visible_edges: graph.visible_edges_at(index),
                })
                .collect();
            let report = StatusReport {
                snapshot: snapshot.as_ref(),
                rows,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", render(&graph, &snapshot));
        }

        Ok(())
    }
}
