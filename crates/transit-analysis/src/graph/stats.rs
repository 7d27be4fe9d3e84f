//! Headline statistics for a station graph.
//!
//! # Statistics Provided
//!
//! - **station_count** / **track_count**: nodes and edges.
//! - **mean_degree** / **max_degree**: mean and maximum station degree. With
//!   `weighted = true` this is the ridership handled by a station (sum of
//!   incident edge weights).
//! - **component_count** / **largest_component_size**: connectivity at a
//!   glance. A healthy network has a single component.
//! - **global_efficiency**: see [`TransitGraph::global_efficiency`].
//! - **content_hash**: identifies the edge set the numbers were computed on.

use serde::Serialize;

use super::build::TransitGraph;

/// Summary statistics for a station graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSummary {
    pub station_count: usize,
    pub track_count: usize,
    /// Whether the degree figures are weighted by ridership.
    pub weighted: bool,
    /// Mean station degree; `0.0` for an empty graph.
    pub mean_degree: f64,
    /// Maximum station degree; `0.0` for an empty graph.
    pub max_degree: f64,
    pub component_count: usize,
    pub largest_component_size: usize,
    pub global_efficiency: f64,
    pub content_hash: String,
}

impl GraphSummary {
    /// Compute the summary of `graph`.
    #[must_use]
    pub fn from_graph(graph: &TransitGraph, weighted: bool) -> Self {
        let degrees: Vec<f64> = graph
            .node_indices()
            .map(|idx| graph.degree_of(idx, weighted))
            .collect();

        let mean_degree = if degrees.is_empty() {
            0.0
        } else {
            degrees.iter().sum::<f64>() / degrees.len() as f64
        };
        let max_degree = degrees.iter().copied().fold(0.0_f64, f64::max);

        let components = graph.connected_components();
        let largest_component_size = components.iter().map(Vec::len).max().unwrap_or(0);

        Self {
            station_count: graph.node_count(),
            track_count: graph.edge_count(),
            weighted,
            mean_degree,
            max_degree,
            component_count: components.len(),
            largest_component_size,
            global_efficiency: graph.global_efficiency(),
            content_hash: graph.content_hash.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use transit_core::config::DuplicateEdgePolicy;
    use transit_core::table::EdgeRow;
    use transit_core::{Station, StationKey};

    use super::*;

    fn edge(a: &str, b: &str, w: f64) -> EdgeRow {
        EdgeRow {
            from: StationKey::new(a, ""),
            to: StationKey::new(b, ""),
            weight: w,
        }
    }

    #[test]
    fn summary_of_empty_graph() {
        let g = TransitGraph::load(Vec::new(), &[], DuplicateEdgePolicy::LastWins).expect("load");
        let s = GraphSummary::from_graph(&g, true);
        assert_eq!(s.station_count, 0);
        assert_eq!(s.track_count, 0);
        assert!(s.mean_degree.abs() < f64::EPSILON);
        assert_eq!(s.component_count, 0);
        assert_eq!(s.largest_component_size, 0);
    }

    #[test]
    fn summary_weighted_ridership() {
        let g = TransitGraph::load(
            vec![Station::bare(StationKey::new("D", ""))],
            &[edge("A", "B", 10.0), edge("B", "C", 5.0)],
            DuplicateEdgePolicy::LastWins,
        )
        .expect("load");
        let s = GraphSummary::from_graph(&g, true);
        assert_eq!(s.station_count, 4);
        assert_eq!(s.track_count, 2);
        // Degrees: A=10, B=15, C=5, D=0 → mean 7.5, max 15.
        assert!((s.mean_degree - 7.5).abs() < 1e-12);
        assert!((s.max_degree - 15.0).abs() < 1e-12);
        assert_eq!(s.component_count, 2);
        assert_eq!(s.largest_component_size, 3);
        assert_eq!(s.content_hash, g.content_hash);

        let unweighted = GraphSummary::from_graph(&g, false);
        assert!((unweighted.max_degree - 2.0).abs() < 1e-12);
    }
}
