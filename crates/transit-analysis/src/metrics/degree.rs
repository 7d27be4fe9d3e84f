//! Degree centrality.

use std::collections::HashMap;

use transit_core::StationKey;

use crate::graph::TransitGraph;

/// Degree of every station: incident ridership when `weighted`, incident
/// track count otherwise. Scores are not normalized.
#[must_use]
pub fn degree_centrality(graph: &TransitGraph, weighted: bool) -> HashMap<StationKey, f64> {
    graph
        .node_indices()
        .filter_map(|idx| {
            graph
                .key(idx)
                .map(|key| (key.clone(), graph.degree_of(idx, weighted)))
        })
        .collect()
}
