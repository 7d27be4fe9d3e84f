//! Connectivity and shortest-path queries on [`TransitGraph`].
//!
//! All distances here are hop counts: edge weights describe ridership, not
//! travel cost, so path-length metrics ignore them.
//!
//! - **Connected components**: BFS over the undirected graph, reported in
//!   first-seen order.
//! - **Average shortest-path length**: mean hop distance over ordered pairs
//!   of a connected node set. Undefined (an error) when the set is empty or
//!   not mutually reachable; `0.0` for a single node.
//! - **Global efficiency**: mean of `1/d(u, v)` over all ordered pairs, with
//!   unreachable pairs contributing zero, so it stays defined on fragmented
//!   graphs.

use std::collections::VecDeque;

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::NodeIndexable;
use transit_core::{AnalysisError, StationKey};

use super::build::TransitGraph;

impl TransitGraph {
    /// Hop distances from `source` to every reachable node, indexed by
    /// `NodeIndex::index()`; `None` marks unreachable or vacant slots.
    #[must_use]
    pub fn bfs_distances(&self, source: NodeIndex) -> Vec<Option<usize>> {
        let mut dist: Vec<Option<usize>> = vec![None; NodeIndexable::node_bound(&self.graph)];
        if self.graph.node_weight(source).is_none() {
            return dist;
        }
        dist[source.index()] = Some(0);

        let mut queue = VecDeque::from([source]);
        while let Some(v) = queue.pop_front() {
            let next = dist[v.index()].map_or(0, |d| d + 1);
            for w in self.graph.neighbors(v) {
                if dist[w.index()].is_none() {
                    dist[w.index()] = Some(next);
                    queue.push_back(w);
                }
            }
        }
        dist
    }

    /// Connected components in first-seen order; members of each component
    /// are sorted by insertion order.
    #[must_use]
    pub fn connected_components(&self) -> Vec<Vec<NodeIndex>> {
        let mut visited = vec![false; NodeIndexable::node_bound(&self.graph)];
        let mut components = Vec::new();

        for start in self.graph.node_indices() {
            if visited[start.index()] {
                continue;
            }
            visited[start.index()] = true;

            let mut members = Vec::new();
            let mut stack = vec![start];
            while let Some(node) = stack.pop() {
                members.push(node);
                for neighbor in self.graph.neighbors(node) {
                    if !visited[neighbor.index()] {
                        visited[neighbor.index()] = true;
                        stack.push(neighbor);
                    }
                }
            }
            members.sort_unstable();
            components.push(members);
        }

        components
    }

    /// The largest connected component. Among equally large components the
    /// first-seen one wins. Empty for an empty graph.
    #[must_use]
    pub fn largest_component(&self) -> Vec<NodeIndex> {
        let mut best: Vec<NodeIndex> = Vec::new();
        for component in self.connected_components() {
            if component.len() > best.len() {
                best = component;
            }
        }
        best
    }

    /// Hop count of the shortest path between two stations, `None` when
    /// they are not connected.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MalformedInput`] if either station is not in
    /// the graph.
    pub fn shortest_path_length(
        &self,
        from: &StationKey,
        to: &StationKey,
    ) -> Result<Option<usize>, AnalysisError> {
        let lookup = |key: &StationKey| {
            self.node_index(key).ok_or_else(|| {
                AnalysisError::malformed(format!("station `{key}` is not in the graph"))
            })
        };
        let source = lookup(from)?;
        let target = lookup(to)?;
        Ok(self.bfs_distances(source)[target.index()])
    }

    /// Mean hop distance over all ordered pairs of `nodes`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::DegenerateGraph`] if `nodes` is empty or
    /// contains a pair with no path between them.
    pub fn average_shortest_path_length(&self, nodes: &[NodeIndex]) -> Result<f64, AnalysisError> {
        match nodes.len() {
            0 => {
                return Err(AnalysisError::degenerate(
                    "average path length of an empty node set",
                ));
            }
            1 => return Ok(0.0),
            _ => {}
        }

        let mut total = 0usize;
        for &u in nodes {
            let dist = self.bfs_distances(u);
            for &v in nodes {
                if u == v {
                    continue;
                }
                match dist.get(v.index()).copied().flatten() {
                    Some(d) => total += d,
                    None => {
                        return Err(AnalysisError::degenerate(format!(
                            "average path length: no path between node {} and node {}",
                            u.index(),
                            v.index()
                        )));
                    }
                }
            }
        }

        let pairs = nodes.len() * (nodes.len() - 1);
        Ok(total as f64 / pairs as f64)
    }

    /// Global efficiency of the whole graph, in `[0, 1]`.
    ///
    /// Graphs with fewer than two stations have efficiency `1.0`.
    #[must_use]
    pub fn global_efficiency(&self) -> f64 {
        let n = self.node_count();
        if n < 2 {
            return 1.0;
        }

        let mut sum = 0.0_f64;
        for u in self.graph.node_indices() {
            for d in self.bfs_distances(u).into_iter().flatten() {
                if d > 0 {
                    sum += 1.0 / d as f64;
                }
            }
        }
        sum / (n * (n - 1)) as f64
    }
}

#[cfg(test)]
mod tests {
    use transit_core::config::DuplicateEdgePolicy;
    use transit_core::table::EdgeRow;
    use transit_core::{Station, StationKey};

    use super::*;

    fn key(name: &str) -> StationKey {
        StationKey::new(name, "")
    }

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> TransitGraph {
        let stations = nodes.iter().map(|n| Station::bare(key(n))).collect();
        let rows: Vec<EdgeRow> = edges
            .iter()
            .map(|(a, b)| EdgeRow {
                from: key(a),
                to: key(b),
                weight: 1.0,
            })
            .collect();
        TransitGraph::load(stations, &rows, DuplicateEdgePolicy::LastWins).expect("load")
    }

    fn names(g: &TransitGraph, nodes: &[NodeIndex]) -> Vec<String> {
        nodes
            .iter()
            .filter_map(|&i| g.key(i))
            .map(|k| k.stop.clone())
            .collect()
    }

    #[test]
    fn components_in_first_seen_order() {
        let g = graph(&["E"], &[("A", "B"), ("C", "D"), ("D", "F")]);
        let comps = g.connected_components();
        assert_eq!(comps.len(), 3);
        assert_eq!(names(&g, &comps[0]), vec!["A", "B"]);
        assert_eq!(names(&g, &comps[1]), vec!["C", "D", "F"]);
        assert_eq!(names(&g, &comps[2]), vec!["E"]);
    }

    #[test]
    fn largest_component_tie_goes_to_first_seen() {
        let g = graph(&[], &[("A", "B"), ("C", "D")]);
        assert_eq!(names(&g, &g.largest_component()), vec!["A", "B"]);
    }

    #[test]
    fn largest_component_of_empty_graph_is_empty() {
        let g = graph(&[], &[]);
        assert!(g.largest_component().is_empty());
        assert!(g.connected_components().is_empty());
    }

    #[test]
    fn shortest_path_hops() {
        let g = graph(&["Z"], &[("A", "B"), ("B", "C"), ("C", "D"), ("A", "D")]);
        assert_eq!(g.shortest_path_length(&key("A"), &key("C")), Ok(Some(2)));
        assert_eq!(g.shortest_path_length(&key("A"), &key("D")), Ok(Some(1)));
        assert_eq!(g.shortest_path_length(&key("A"), &key("A")), Ok(Some(0)));
        assert_eq!(g.shortest_path_length(&key("A"), &key("Z")), Ok(None));
        assert!(g.shortest_path_length(&key("A"), &key("nope")).is_err());
    }

    #[test]
    fn average_path_length_of_path_graph() {
        // A - B - C: distances 1, 2, 1 in each direction → 8 / 6
        let g = graph(&[], &[("A", "B"), ("B", "C")]);
        let apl = g
            .average_shortest_path_length(&g.largest_component())
            .expect("apl");
        assert!((apl - 4.0 / 3.0).abs() < 1e-12, "got {apl}");
    }

    #[test]
    fn average_path_length_single_node_is_zero() {
        let g = graph(&["A"], &[]);
        let nodes: Vec<NodeIndex> = g.node_indices().collect();
        assert_eq!(g.average_shortest_path_length(&nodes), Ok(0.0));
    }

    #[test]
    fn average_path_length_degenerate_cases() {
        let g = graph(&["A", "B"], &[]);
        let nodes: Vec<NodeIndex> = g.node_indices().collect();
        assert!(matches!(
            g.average_shortest_path_length(&nodes),
            Err(AnalysisError::DegenerateGraph { .. })
        ));
        assert!(matches!(
            g.average_shortest_path_length(&[]),
            Err(AnalysisError::DegenerateGraph { .. })
        ));
    }

    #[test]
    fn efficiency_of_complete_graph_is_one() {
        let g = graph(
            &[],
            &[("A", "B"), ("A", "C"), ("A", "D"), ("B", "C"), ("B", "D"), ("C", "D")],
        );
        assert!((g.global_efficiency() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn efficiency_counts_unreachable_as_zero() {
        // Two disjoint edges: 4 reachable ordered pairs at distance 1 out of 12.
        let g = graph(&[], &[("A", "B"), ("C", "D")]);
        assert!((g.global_efficiency() - 4.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn efficiency_of_tiny_graphs() {
        assert!((graph(&[], &[]).global_efficiency() - 1.0).abs() < f64::EPSILON);
        assert!((graph(&["A"], &[]).global_efficiency() - 1.0).abs() < f64::EPSILON);
        assert!(graph(&["A", "B"], &[]).global_efficiency().abs() < f64::EPSILON);
    }

    #[test]
    fn queries_after_removal_skip_vacant_slots() {
        let mut g = graph(&[], &[("A", "B"), ("B", "C"), ("C", "D")]);
        g.remove_node(&key("B")).expect("remove");
        let comps = g.connected_components();
        assert_eq!(comps.len(), 2);
        assert_eq!(names(&g, &g.largest_component()), vec!["C", "D"]);
        // A isolated, C-D linked: 2 reachable ordered pairs of 6.
        assert!((g.global_efficiency() - 2.0 / 6.0).abs() < 1e-12);
    }
}
