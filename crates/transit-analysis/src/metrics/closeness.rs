//! Closeness centrality.
//!
//! For a station `u` with `r` other stations reachable at total hop
//! distance `D`:
//!
//! ```text
//! closeness(u) = (r / D) · (r / (n - 1))
//! ```
//!
//! The second factor (Wasserman–Faust) scales down stations stuck in small
//! components, so a two-station island does not outrank a hub of the main
//! network. Isolated stations score `0.0`.

use std::collections::HashMap;

use tracing::instrument;
use transit_core::StationKey;

use crate::graph::TransitGraph;

/// Compute closeness centrality (hop distances) for every station.
#[must_use]
#[instrument(skip(graph), fields(stations = graph.node_count()))]
pub fn closeness_centrality(graph: &TransitGraph) -> HashMap<StationKey, f64> {
    let n = graph.node_count();
    let mut result = HashMap::with_capacity(n);

    for u in graph.node_indices() {
        let Some(key) = graph.key(u) else {
            continue;
        };

        let (reachable, total) = graph
            .bfs_distances(u)
            .into_iter()
            .flatten()
            .filter(|&d| d > 0)
            .fold((0usize, 0usize), |(r, t), d| (r + 1, t + d));

        let score = if total > 0 && n > 1 {
            let r = reachable as f64;
            (r / total as f64) * (r / (n - 1) as f64)
        } else {
            0.0
        };
        result.insert(key.clone(), score);
    }

    result
}
