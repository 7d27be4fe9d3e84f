//! Robustness analysis: how the network degrades as stations are removed.
//!
//! # Overview
//!
//! An attack removes stations one at a time from a working copy of the
//! graph and samples three metrics after every removal:
//!
//! - **Largest-component fraction**: size of the largest connected
//!   component over the starting station count.
//! - **Average path length**: mean hop distance inside the largest
//!   component.
//! - **Global efficiency**: mean inverse hop distance over the whole
//!   working graph.
//!
//! The removal order is fixed before the first removal. A random attack
//! shuffles the stations with a seeded RNG; the centrality attacks follow
//! the descending [`Ranking`](crate::metrics::ranking::Ranking) of the
//! intact graph and are not recomputed as the graph degrades.
//!
//! # Samples
//!
//! Sample `0` is the intact graph. Sample `k` is taken after `k` removals
//! and has `fraction_removed = k / n`. Once the largest component shrinks to
//! a single station, path length and efficiency are recorded as `None` and
//! the run remembers the step where that first happened; the
//! largest-component fraction keeps being recorded to the end.
//!
//! # Impact
//!
//! [`impact::assess_impact`] removes a caller-chosen list of stations and
//! reports how each metric moved from the intact network.

mod attack;
pub mod impact;

use std::fmt;

use serde::{Deserialize, Serialize};
use transit_core::config::TransitConfig;
use transit_core::StationKey;

use crate::metrics::ranking::{Centrality, RankingOptions};

pub use attack::{removal_order, simulate, simulate_all};
pub use impact::{assess_impact, ImpactReport};

/// Rule deciding the order in which stations are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackStrategy {
    /// Seeded uniform random permutation.
    Random,
    /// Highest degree first.
    Degree,
    /// Highest betweenness first.
    Betweenness,
    /// Highest closeness first.
    Closeness,
}

impl AttackStrategy {
    /// Every strategy, in reporting order.
    pub const ALL: [Self; 4] = [
        Self::Random,
        Self::Degree,
        Self::Betweenness,
        Self::Closeness,
    ];

    /// The centrality a targeted strategy ranks by; `None` for random.
    #[must_use]
    pub const fn centrality(self) -> Option<Centrality> {
        match self {
            Self::Random => None,
            Self::Degree => Some(Centrality::Degree),
            Self::Betweenness => Some(Centrality::Betweenness),
            Self::Closeness => Some(Centrality::Closeness),
        }
    }
}

impl fmt::Display for AttackStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.centrality() {
            Some(centrality) => centrality.fmt(f),
            None => f.write_str("random"),
        }
    }
}

/// A sampled robustness metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    LargestComponentFraction,
    AveragePathLength,
    Efficiency,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LargestComponentFraction => "largest component fraction",
            Self::AveragePathLength => "average path length",
            Self::Efficiency => "efficiency",
        };
        f.write_str(s)
    }
}

/// Metrics of the working graph after `step` removals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobustnessSample {
    pub step: usize,
    pub fraction_removed: f64,
    pub largest_component_fraction: f64,
    /// `None` once the largest component has fewer than two stations.
    pub average_path_length: Option<f64>,
    /// `None` once the largest component has fewer than two stations.
    pub efficiency: Option<f64>,
}

impl RobustnessSample {
    /// Value of `metric` in this sample.
    #[must_use]
    pub const fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::LargestComponentFraction => Some(self.largest_component_fraction),
            Metric::AveragePathLength => self.average_path_length,
            Metric::Efficiency => self.efficiency,
        }
    }
}

/// Result of one attack simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttackRun {
    pub strategy: AttackStrategy,
    /// RNG seed of a random attack, so the run can be replayed.
    pub seed: Option<u64>,
    /// Station count of the intact graph.
    pub node_count: usize,
    /// Stations in the order they were removed.
    pub order: Vec<StationKey>,
    pub samples: Vec<RobustnessSample>,
    /// First step at which path length and efficiency became undefined.
    pub degenerate_from: Option<usize>,
}

impl AttackRun {
    /// `(fraction_removed, value)` pairs for `metric`, one per sample.
    #[must_use]
    pub fn series(&self, metric: Metric) -> Vec<(f64, Option<f64>)> {
        self.samples
            .iter()
            .map(|s| (s.fraction_removed, s.value(metric)))
            .collect()
    }

    /// Number of stations removed.
    #[must_use]
    pub fn removed(&self) -> usize {
        self.samples.len().saturating_sub(1)
    }

    /// The last sample, i.e. the most degraded state reached.
    #[must_use]
    pub fn last(&self) -> Option<&RobustnessSample> {
        self.samples.last()
    }
}

/// Parameters shared by every attack run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackOptions {
    /// Fraction of stations to remove; values above 1 are clamped.
    pub fraction: f64,
    /// Seed for the random strategy; drawn fresh when `None`.
    pub seed: Option<u64>,
    pub ranking: RankingOptions,
}

impl Default for AttackOptions {
    fn default() -> Self {
        Self {
            fraction: 0.99,
            seed: None,
            ranking: RankingOptions::default(),
        }
    }
}

impl From<&TransitConfig> for AttackOptions {
    fn from(config: &TransitConfig) -> Self {
        Self {
            fraction: config.robustness.attack_fraction,
            seed: config.robustness.seed,
            ranking: RankingOptions::from(&config.ranking),
        }
    }
}
