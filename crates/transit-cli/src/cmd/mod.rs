pub mod attack;
pub mod flow;
pub mod impact;
pub mod rank;
pub mod summary;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use transit_analysis::TransitGraph;
use transit_core::config::TransitConfig;
use transit_core::table::{load_edges, load_nodes};

/// Input tables shared by every graph command.
#[derive(Args, Debug, Clone)]
pub struct GraphArgs {
    /// Edge table (`from`, `to` and a ridership column).
    #[arg(long)]
    pub edges: PathBuf,

    /// Node table with station attributes.
    #[arg(long)]
    pub nodes: Option<PathBuf>,

    /// Weight column of the edge table (default: first of
    /// ridership, total_ridership, weight).
    #[arg(long)]
    pub weight_column: Option<String>,
}

impl GraphArgs {
    /// Load the graph, falling back to `default_column` from configuration
    /// when no `--weight-column` was given.
    pub fn load(
        &self,
        config: &TransitConfig,
        default_column: Option<&str>,
    ) -> anyhow::Result<TransitGraph> {
        let column = self.weight_column.as_deref().or(default_column);
        load_graph(&self.edges, self.nodes.as_deref(), column, config)
    }
}

/// Read node and edge tables and build a [`TransitGraph`].
pub fn load_graph(
    edges: &Path,
    nodes: Option<&Path>,
    weight_column: Option<&str>,
    config: &TransitConfig,
) -> anyhow::Result<TransitGraph> {
    let stations = match nodes {
        Some(path) => load_nodes(path)?,
        None => Vec::new(),
    };
    let rows = load_edges(edges, weight_column)?;
    TransitGraph::load(stations, &rows, config.graph.duplicate_edges)
        .with_context(|| format!("building graph from {}", edges.display()))
}
