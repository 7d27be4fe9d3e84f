//! Graph construction from station and edge tables.
//!
//! # Overview
//!
//! [`TransitGraph::load`] turns the rows produced by
//! [`transit_core::table`] into an undirected weighted graph.
//!
//! ## Node Order
//!
//! Stations are inserted in the order they are first seen in the edge table,
//! followed by node-table stations that no edge touches. Rankings break
//! ties by this order, so it is part of the observable contract.
//!
//! ## Attributes
//!
//! A station referenced by an edge but absent from the node table is added
//! with empty attributes. Duplicate keys in the node table are rejected.
//!
//! ## Duplicate Edges
//!
//! Repeated rows for the same unordered pair are combined according to
//! [`DuplicateEdgePolicy`]. Self-loops carry no connectivity and are dropped.
//!
//! ## Content Hash
//!
//! [`TransitGraph::content_hash`] is a BLAKE3 hash of the sorted edge set as
//! loaded. Two loads of the same tables produce the same hash regardless of
//! row order.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use tracing::{debug, instrument, warn};
use transit_core::config::DuplicateEdgePolicy;
use transit_core::table::EdgeRow;
use transit_core::{AnalysisError, Station, StationKey};

// ---------------------------------------------------------------------------
// TransitGraph
// ---------------------------------------------------------------------------

/// An undirected weighted station graph.
///
/// Cloning produces an independent working copy; the simulator never
/// mutates the graph it was handed.
#[derive(Debug, Clone)]
pub struct TransitGraph {
    /// Undirected graph: nodes = stations, edge weight = ridership.
    pub graph: StableUnGraph<Station, f64>,
    /// Mapping from station key to petgraph `NodeIndex`.
    pub node_map: HashMap<StationKey, NodeIndex>,
    /// BLAKE3 content hash of the edge set as loaded.
    pub content_hash: String,
}

impl TransitGraph {
    /// Build a graph from a node table and an edge table.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MalformedInput`] if the node table repeats a
    /// station key or an edge weight is negative or non-finite.
    #[instrument(skip(stations, edges), fields(stations = stations.len(), edges = edges.len()))]
    pub fn load(
        stations: Vec<Station>,
        edges: &[EdgeRow],
        policy: DuplicateEdgePolicy,
    ) -> Result<Self, AnalysisError> {
        // Step 1: index the node table, rejecting duplicate keys.
        let mut attributes: HashMap<StationKey, Station> = HashMap::with_capacity(stations.len());
        let mut table_order = Vec::with_capacity(stations.len());
        for station in stations {
            if attributes.contains_key(&station.key) {
                return Err(AnalysisError::malformed(format!(
                    "duplicate station `{}` in node table",
                    station.key
                )));
            }
            table_order.push(station.key.clone());
            attributes.insert(station.key.clone(), station);
        }

        let mut graph = StableUnGraph::<Station, f64>::with_capacity(table_order.len(), edges.len());
        let mut node_map: HashMap<StationKey, NodeIndex> = HashMap::with_capacity(table_order.len());

        let mut intern = |key: &StationKey, graph: &mut StableUnGraph<Station, f64>| -> NodeIndex {
            *node_map.entry(key.clone()).or_insert_with(|| {
                let station = attributes
                    .remove(key)
                    .unwrap_or_else(|| Station::bare(key.clone()));
                graph.add_node(station)
            })
        };

        // Step 2: edges, creating endpoint stations on first sight.
        let mut self_loops = 0usize;
        let mut merged = 0usize;
        for row in edges {
            if !row.weight.is_finite() || row.weight < 0.0 {
                return Err(AnalysisError::malformed(format!(
                    "edge {} -- {} has invalid weight {}",
                    row.from, row.to, row.weight
                )));
            }
            if row.from == row.to {
                self_loops += 1;
                continue;
            }

            let a = intern(&row.from, &mut graph);
            let b = intern(&row.to, &mut graph);

            match graph.find_edge(a, b) {
                Some(existing) => {
                    merged += 1;
                    if let Some(weight) = graph.edge_weight_mut(existing) {
                        match policy {
                            DuplicateEdgePolicy::LastWins => *weight = row.weight,
                            DuplicateEdgePolicy::Sum => *weight += row.weight,
                        }
                    }
                }
                None => {
                    graph.add_edge(a, b, row.weight);
                }
            }
        }

        // Step 3: stations that no edge touches.
        for key in &table_order {
            intern(key, &mut graph);
        }

        if self_loops > 0 {
            warn!(self_loops, "dropped self-loop edges");
        }
        if merged > 0 {
            debug!(merged, ?policy, "combined duplicate edges");
        }

        let content_hash = compute_edge_hash(&graph);

        Ok(Self {
            graph,
            node_map,
            content_hash,
        })
    }

    /// Return the number of stations in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of tracks (edges) in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for a station.
    #[must_use]
    pub fn node_index(&self, key: &StationKey) -> Option<NodeIndex> {
        self.node_map.get(key).copied()
    }

    /// Return the station stored at `idx`.
    #[must_use]
    pub fn station(&self, idx: NodeIndex) -> Option<&Station> {
        self.graph.node_weight(idx)
    }

    /// Return the key of the station stored at `idx`.
    #[must_use]
    pub fn key(&self, idx: NodeIndex) -> Option<&StationKey> {
        self.graph.node_weight(idx).map(|s| &s.key)
    }

    /// Station indices in insertion order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Degree of the station at `idx`: incident edge weight sum when
    /// `weighted`, incident edge count otherwise.
    #[must_use]
    pub fn degree_of(&self, idx: NodeIndex, weighted: bool) -> f64 {
        if weighted {
            self.graph.edges(idx).map(|e| *e.weight()).sum()
        } else {
            self.graph.edges(idx).count() as f64
        }
    }

    /// Degree of `key`, or `None` if the station is not in the graph.
    #[must_use]
    pub fn degree(&self, key: &StationKey, weighted: bool) -> Option<f64> {
        self.node_index(key).map(|idx| self.degree_of(idx, weighted))
    }

    /// Adjacent stations of `key` in insertion order.
    ///
    /// Returns an empty list for unknown stations.
    #[must_use]
    pub fn neighbors(&self, key: &StationKey) -> Vec<StationKey> {
        let Some(idx) = self.node_index(key) else {
            return Vec::new();
        };
        let mut adjacent: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        adjacent.sort_unstable();
        adjacent.dedup();
        adjacent
            .into_iter()
            .filter_map(|n| self.key(n).cloned())
            .collect()
    }

    /// Remove a station and its incident edges.
    ///
    /// Call this on a clone: the canonical graph stays read-only.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MalformedInput`] if the station is not in
    /// the graph (for instance, removed twice).
    pub fn remove_node(&mut self, key: &StationKey) -> Result<Station, AnalysisError> {
        let idx = self.node_map.remove(key).ok_or_else(|| {
            AnalysisError::malformed(format!("station `{key}` is not in the graph"))
        })?;
        self.graph.remove_node(idx).ok_or_else(|| {
            AnalysisError::malformed(format!("station `{key}` has a stale index"))
        })
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Compute a BLAKE3 hash of the sorted edge list.
fn compute_edge_hash(graph: &StableUnGraph<Station, f64>) -> String {
    let mut edges: Vec<(String, String, u64)> = graph
        .edge_references()
        .filter_map(|e| {
            let a = graph.node_weight(e.source())?.key.to_literal();
            let b = graph.node_weight(e.target())?.key.to_literal();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            Some((lo, hi, e.weight().to_bits()))
        })
        .collect();
    edges.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for (lo, hi, bits) in &edges {
        hasher.update(lo.as_bytes());
        hasher.update(b"\x00");
        hasher.update(hi.as_bytes());
        hasher.update(b"\x00");
        hasher.update(&bits.to_le_bytes());
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> StationKey {
        StationKey::new(name, "1")
    }

    fn edge(a: &str, b: &str, w: f64) -> EdgeRow {
        EdgeRow {
            from: key(a),
            to: key(b),
            weight: w,
        }
    }

    fn station(name: &str, borough: &str) -> Station {
        Station {
            borough: Some(borough.to_string()),
            ..Station::bare(key(name))
        }
    }

    #[test]
    fn empty_tables_produce_empty_graph() {
        let g = TransitGraph::load(Vec::new(), &[], DuplicateEdgePolicy::LastWins).expect("load");
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.content_hash.starts_with("blake3:"));
    }

    #[test]
    fn edge_endpoints_come_first_then_isolated_stations() {
        let g = TransitGraph::load(
            vec![station("Z", "Q"), station("B", "M")],
            &[edge("A", "B", 1.0)],
            DuplicateEdgePolicy::LastWins,
        )
        .expect("load");

        let order: Vec<&str> = g
            .node_indices()
            .filter_map(|i| g.key(i))
            .map(|k| k.stop.as_str())
            .collect();
        assert_eq!(order, vec!["A", "B", "Z"]);

        // B picked up its node-table attributes, A stayed bare.
        let b = g.node_index(&key("B")).expect("B");
        assert_eq!(g.station(b).and_then(|s| s.borough.as_deref()), Some("M"));
        let a = g.node_index(&key("A")).expect("A");
        assert!(g.station(a).expect("A station").borough.is_none());
    }

    #[test]
    fn duplicate_node_rows_are_rejected() {
        let err = TransitGraph::load(
            vec![station("A", "M"), station("A", "Q")],
            &[],
            DuplicateEdgePolicy::LastWins,
        )
        .expect_err("duplicate");
        assert!(matches!(err, AnalysisError::MalformedInput { .. }));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let err = TransitGraph::load(Vec::new(), &[edge("A", "B", -1.0)], DuplicateEdgePolicy::Sum)
            .expect_err("negative");
        assert!(err.to_string().contains("invalid weight"), "{err}");
    }

    #[test]
    fn duplicate_edges_last_wins() {
        let g = TransitGraph::load(
            Vec::new(),
            &[edge("A", "B", 4.0), edge("B", "A", 6.0)],
            DuplicateEdgePolicy::LastWins,
        )
        .expect("load");
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.degree(&key("A"), true), Some(6.0));
    }

    #[test]
    fn duplicate_edges_summed() {
        let g = TransitGraph::load(
            Vec::new(),
            &[edge("A", "B", 4.0), edge("B", "A", 6.0)],
            DuplicateEdgePolicy::Sum,
        )
        .expect("load");
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.degree(&key("B"), true), Some(10.0));
    }

    #[test]
    fn self_loops_are_dropped() {
        let g = TransitGraph::load(
            Vec::new(),
            &[edge("A", "A", 3.0), edge("A", "B", 1.0)],
            DuplicateEdgePolicy::LastWins,
        )
        .expect("load");
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.degree(&key("A"), false), Some(1.0));
    }

    #[test]
    fn weighted_and_unweighted_degree() {
        let g = TransitGraph::load(
            Vec::new(),
            &[edge("A", "B", 10.0), edge("B", "C", 5.0)],
            DuplicateEdgePolicy::LastWins,
        )
        .expect("load");
        assert_eq!(g.degree(&key("B"), true), Some(15.0));
        assert_eq!(g.degree(&key("B"), false), Some(2.0));
        assert_eq!(g.degree(&key("missing"), false), None);
    }

    #[test]
    fn neighbors_in_insertion_order() {
        let g = TransitGraph::load(
            Vec::new(),
            &[edge("B", "C", 1.0), edge("A", "B", 1.0), edge("B", "D", 1.0)],
            DuplicateEdgePolicy::LastWins,
        )
        .expect("load");
        let names: Vec<String> = g
            .neighbors(&key("B"))
            .into_iter()
            .map(|k| k.stop)
            .collect();
        assert_eq!(names, vec!["C", "A", "D"]);
    }

    #[test]
    fn remove_node_cascades_edges_and_keeps_other_indices() {
        let mut g = TransitGraph::load(
            Vec::new(),
            &[edge("A", "B", 1.0), edge("B", "C", 1.0)],
            DuplicateEdgePolicy::LastWins,
        )
        .expect("load");
        let c_before = g.node_index(&key("C")).expect("C");

        let removed = g.remove_node(&key("B")).expect("remove");
        assert_eq!(removed.key, key("B"));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.node_index(&key("C")), Some(c_before));

        let again = g.remove_node(&key("B"));
        assert!(matches!(again, Err(AnalysisError::MalformedInput { .. })));
    }

    #[test]
    fn clone_is_independent() {
        let canonical = TransitGraph::load(
            Vec::new(),
            &[edge("A", "B", 1.0)],
            DuplicateEdgePolicy::LastWins,
        )
        .expect("load");
        let mut working = canonical.clone();
        working.remove_node(&key("A")).expect("remove");
        assert_eq!(canonical.node_count(), 2);
        assert_eq!(working.node_count(), 1);
    }

    #[test]
    fn content_hash_ignores_row_order_but_tracks_weights() {
        let a = TransitGraph::load(
            Vec::new(),
            &[edge("A", "B", 1.0), edge("B", "C", 2.0)],
            DuplicateEdgePolicy::LastWins,
        )
        .expect("load");
        let b = TransitGraph::load(
            Vec::new(),
            &[edge("C", "B", 2.0), edge("B", "A", 1.0)],
            DuplicateEdgePolicy::LastWins,
        )
        .expect("load");
        let c = TransitGraph::load(
            Vec::new(),
            &[edge("A", "B", 1.0), edge("B", "C", 3.0)],
            DuplicateEdgePolicy::LastWins,
        )
        .expect("load");
        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.content_hash, c.content_hash);
    }
}
