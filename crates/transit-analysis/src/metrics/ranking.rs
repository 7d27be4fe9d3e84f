//! Descending station rankings shared by top-k tables and attack orders.
//!
//! # Ordering
//!
//! Entries are sorted by score, highest first. Ties keep graph insertion
//! order (first-seen station wins), which the sort guarantees by being
//! stable over a list that starts in insertion order. Scores that agree to
//! nine decimal places count as ties, so symmetric stations whose scores
//! differ only by floating-point summation order still rank by first sight.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use transit_core::config::RankingConfig;
use transit_core::StationKey;

use super::betweenness::betweenness_centrality;
use super::closeness::closeness_centrality;
use super::degree::degree_centrality;
use crate::graph::TransitGraph;

/// Which centrality a ranking is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Centrality {
    Degree,
    Betweenness,
    Closeness,
}

impl fmt::Display for Centrality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Degree => "degree",
            Self::Betweenness => "betweenness",
            Self::Closeness => "closeness",
        };
        f.write_str(s)
    }
}

/// Weighting choices applied wherever a ranking is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingOptions {
    pub weighted_degree: bool,
    pub weighted_betweenness: bool,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            weighted_degree: true,
            weighted_betweenness: true,
        }
    }
}

impl From<&RankingConfig> for RankingOptions {
    fn from(config: &RankingConfig) -> Self {
        Self {
            weighted_degree: config.weighted_degree,
            weighted_betweenness: config.weighted_betweenness,
        }
    }
}

/// One row of a ranking table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedStation {
    /// 1-based position.
    pub rank: usize,
    pub key: StationKey,
    pub score: f64,
}

/// Stations ordered by descending centrality score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub centrality: Centrality,
    pub entries: Vec<RankedStation>,
}

impl Ranking {
    /// Build a ranking over every station of `graph` from a score map.
    /// Stations missing from `scores` score `0.0`.
    #[must_use]
    pub fn from_scores(
        graph: &TransitGraph,
        centrality: Centrality,
        scores: &HashMap<StationKey, f64>,
    ) -> Self {
        let mut scored: Vec<(StationKey, f64)> = graph
            .node_indices()
            .filter_map(|idx| graph.key(idx))
            .map(|key| (key.clone(), scores.get(key).copied().unwrap_or(0.0)))
            .collect();

        // Stable: equal keys keep insertion order.
        scored.sort_by(|a, b| tie_key(b.1).total_cmp(&tie_key(a.1)));

        let entries = scored
            .into_iter()
            .enumerate()
            .map(|(i, (key, score))| RankedStation {
                rank: i + 1,
                key,
                score,
            })
            .collect();

        Self {
            centrality,
            entries,
        }
    }

    /// The first `k` entries (fewer if the graph is smaller).
    #[must_use]
    pub fn top(&self, k: usize) -> &[RankedStation] {
        &self.entries[..k.min(self.entries.len())]
    }

    /// Station keys in ranking order; used as an attack removal order.
    #[must_use]
    pub fn order(&self) -> Vec<StationKey> {
        self.entries.iter().map(|e| e.key.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn tie_key(score: f64) -> f64 {
    (score * 1e9).round()
}

/// Rank stations by degree (ridership when `weighted`).
#[must_use]
pub fn rank_by_degree(graph: &TransitGraph, weighted: bool) -> Ranking {
    Ranking::from_scores(
        graph,
        Centrality::Degree,
        &degree_centrality(graph, weighted),
    )
}

/// Rank stations by betweenness (edge weight as distance when `weighted`).
#[must_use]
pub fn rank_by_betweenness(graph: &TransitGraph, weighted: bool) -> Ranking {
    Ranking::from_scores(
        graph,
        Centrality::Betweenness,
        &betweenness_centrality(graph, weighted),
    )
}

/// Rank stations by closeness.
#[must_use]
pub fn rank_by_closeness(graph: &TransitGraph) -> Ranking {
    Ranking::from_scores(graph, Centrality::Closeness, &closeness_centrality(graph))
}

/// Rank by `centrality` with the weighting in `options`.
#[must_use]
pub fn rank(graph: &TransitGraph, centrality: Centrality, options: RankingOptions) -> Ranking {
    match centrality {
        Centrality::Degree => rank_by_degree(graph, options.weighted_degree),
        Centrality::Betweenness => rank_by_betweenness(graph, options.weighted_betweenness),
        Centrality::Closeness => rank_by_closeness(graph),
    }
}
