//! Betweenness centrality via Brandes' algorithm.
//!
//! # Overview
//!
//! Betweenness centrality measures how often a station lies on shortest
//! paths between other pairs of stations. High-betweenness stations are
//! transfer points whose loss forces long detours or splits the network.
//!
//! # Algorithm
//!
//! Brandes (2001):
//!
//! 1. For each source `s`, compute shortest-path counts `sigma` and the
//!    predecessor lists of the shortest-path DAG. Unweighted graphs use BFS;
//!    weighted graphs use Dijkstra with the edge weight as distance.
//! 2. Accumulate dependency scores in reverse settle order (farthest first).
//! 3. Sum the dependency scores across all sources.
//!
//! Complexity: O(V·E) unweighted, O(V·E + V²·log V) weighted.
//!
//! # Output
//!
//! Every unordered pair is visited from both ends, so raw sums count each
//! pair twice. Scores are normalized by `1 / ((n-1)(n-2))` for `n > 2`,
//! which puts a station on every shortest path of every other pair at `1.0`.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, NodeIndexable};
use tracing::instrument;
use transit_core::StationKey;

use crate::graph::TransitGraph;

/// Compute normalized betweenness centrality for every station.
///
/// Disconnected stations and stations with no shortest paths through them
/// score `0.0`.
#[must_use]
#[instrument(skip(graph), fields(stations = graph.node_count()))]
pub fn betweenness_centrality(graph: &TransitGraph, weighted: bool) -> HashMap<StationKey, f64> {
    let n = graph.node_count();
    if n == 0 {
        return HashMap::new();
    }
    let bound = NodeIndexable::node_bound(&graph.graph);

    // Node-indexed betweenness accumulator.
    let mut cb: Vec<f64> = vec![0.0; bound];

    for s in graph.node_indices() {
        let sp = if weighted {
            weighted_paths(graph, s, bound)
        } else {
            hop_paths(graph, s, bound)
        };

        // Accumulate dependencies in reverse settle order.
        let mut delta: Vec<f64> = vec![0.0; bound];
        for &w in sp.order.iter().rev() {
            let wi = w.index();
            for &v in &sp.predecessors[wi] {
                let vi = v.index();
                if sp.sigma[wi] > 0.0 {
                    delta[vi] += (sp.sigma[vi] / sp.sigma[wi]) * (1.0 + delta[wi]);
                }
            }
            if w != s {
                cb[wi] += delta[wi];
            }
        }
    }

    let scale = if n > 2 {
        1.0 / ((n - 1) * (n - 2)) as f64
    } else {
        1.0
    };

    graph
        .node_indices()
        .filter_map(|idx| graph.key(idx).map(|key| (key.clone(), cb[idx.index()] * scale)))
        .collect()
}

/// Single-source shortest-path DAG.
struct ShortestPaths {
    /// Nodes in non-decreasing distance order.
    order: Vec<NodeIndex>,
    predecessors: Vec<Vec<NodeIndex>>,
    /// Number of shortest paths from the source.
    sigma: Vec<f64>,
}

fn hop_paths(graph: &TransitGraph, s: NodeIndex, bound: usize) -> ShortestPaths {
    let mut order = Vec::new();
    let mut predecessors: Vec<Vec<NodeIndex>> = vec![Vec::new(); bound];
    let mut sigma = vec![0.0; bound];
    // -1 = unvisited.
    let mut dist: Vec<i64> = vec![-1; bound];

    sigma[s.index()] = 1.0;
    dist[s.index()] = 0;
    let mut queue = VecDeque::from([s]);

    while let Some(v) = queue.pop_front() {
        let vi = v.index();
        order.push(v);
        for w in graph.graph.neighbors(v) {
            let wi = w.index();
            if dist[wi] < 0 {
                dist[wi] = dist[vi] + 1;
                queue.push_back(w);
            }
            if dist[wi] == dist[vi] + 1 {
                sigma[wi] += sigma[vi];
                predecessors[wi].push(v);
            }
        }
    }

    ShortestPaths {
        order,
        predecessors,
        sigma,
    }
}

/// Min-heap entry for Dijkstra; `seq` keeps pops deterministic on ties.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    dist: f64,
    seq: usize,
    node: NodeIndex,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn weighted_paths(graph: &TransitGraph, s: NodeIndex, bound: usize) -> ShortestPaths {
    let mut order = Vec::new();
    let mut predecessors: Vec<Vec<NodeIndex>> = vec![Vec::new(); bound];
    let mut sigma = vec![0.0; bound];
    let mut best: Vec<Option<f64>> = vec![None; bound];
    let mut settled = vec![false; bound];

    let mut seq = 0usize;
    let mut heap = BinaryHeap::new();
    sigma[s.index()] = 1.0;
    best[s.index()] = Some(0.0);
    heap.push(Candidate {
        dist: 0.0,
        seq,
        node: s,
    });

    while let Some(Candidate { dist, node: v, .. }) = heap.pop() {
        let vi = v.index();
        if settled[vi] {
            continue;
        }
        settled[vi] = true;
        order.push(v);

        for edge in graph.graph.edges(v) {
            let w = if edge.source() == v {
                edge.target()
            } else {
                edge.source()
            };
            let wi = w.index();
            if settled[wi] {
                continue;
            }
            let candidate = dist + *edge.weight();
            match best[wi] {
                Some(current) if candidate > current => {}
                Some(current) if candidate == current => {
                    sigma[wi] += sigma[vi];
                    predecessors[wi].push(v);
                }
                _ => {
                    best[wi] = Some(candidate);
                    sigma[wi] = sigma[vi];
                    predecessors[wi].clear();
                    predecessors[wi].push(v);
                    seq += 1;
                    heap.push(Candidate {
                        dist: candidate,
                        seq,
                        node: w,
                    });
                }
            }
        }
    }

    ShortestPaths {
        order,
        predecessors,
        sigma,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
