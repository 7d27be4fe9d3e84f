//! Flow-conservation solver.
//!
//! # Model
//!
//! Every ordered pair of distinct stations `(i, j)` carries a flow
//! `f[i,j] ≥ 1`. The flows must be symmetric (`f[i,j] = f[j,i]`), conserve
//! flow at every station, and sum to the station's target at every
//! station, both in and out.
//!
//! Symmetry makes the imbalance `Σ (f[i,j] - f[j,i])²` identically zero,
//! so it cannot choose between feasible flows. The solver instead keeps one
//! variable per unordered pair (which satisfies symmetry and conservation
//! outright) and picks the feasible flow minimizing `½ Σ f²`: the most
//! evenly spread one, which is unique.
//!
//! # Algorithm
//!
//! With `A` the station-by-pair incidence matrix and `t` the targets, the
//! problem is `min ½‖f‖²` subject to `A f = t`, `f ≥ 1`. Its dual is
//! concave and piecewise quadratic in one multiplier `λ_i` per station,
//! with `f[i,j] = max(1, λ_i + λ_j)`. [`solve`] maximizes the dual with a
//! semismooth Newton method:
//!
//! 1. Pairs with `λ_i + λ_j ≥ 1` form the active set `S`.
//! 2. Solve `(A_S A_Sᵀ + εI) d = t - A f` with a Cholesky factorization
//!    (SVD pseudo-inverse if that fails).
//! 3. Backtrack along `d` until the dual rises enough (Armijo).
//!
//! The solve stops once every station's inflow is within `tolerance` of
//! its target, relative to `max(1, largest target)`.
//!
//! # Feasibility
//!
//! Writing `e_i = t_i - (N - 1)` for the excess over the mandatory unit
//! flows, a model with `N ≥ 3` stations is feasible exactly when every
//! `e_i ≥ 0` and no `e_i` exceeds the sum of the others. Infeasible models
//! are rejected before any iteration runs.

mod model;
mod solver;

use std::time::Duration;

use serde::Serialize;
use transit_core::config::FlowConfig;
use transit_core::table::TargetRow;
use transit_core::{SolverStatus, StationKey};

pub use solver::solve;

/// Target inflow (and outflow) of one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowTarget {
    pub key: StationKey,
    pub target_inflow: f64,
}

impl FlowTarget {
    #[must_use]
    pub const fn new(key: StationKey, target_inflow: f64) -> Self {
        Self { key, target_inflow }
    }
}

impl From<&TargetRow> for FlowTarget {
    fn from(row: &TargetRow) -> Self {
        Self::new(row.key.clone(), row.ridership)
    }
}

/// Stopping rules for [`solve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowOptions {
    /// Maximum inflow residual, relative to `max(1, largest target)`.
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Wall-clock limit for the whole solve.
    pub timeout: Duration,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self::from(&FlowConfig::default())
    }
}

impl From<&FlowConfig> for FlowOptions {
    fn from(config: &FlowConfig) -> Self {
        Self {
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// A solved flow between every pair of stations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSolution {
    /// Stations in input order.
    pub stations: Vec<StationKey>,
    /// One flow per unordered pair, in [`FlowSolution::pair_index`] order.
    pub flows: Vec<f64>,
    pub status: SolverStatus,
    pub iterations: usize,
    /// Largest absolute difference between a station's inflow and target.
    pub max_residual: f64,
    /// `Σ (f[i,j] - f[j,i])²` over ordered pairs; zero by construction.
    pub imbalance: f64,
    /// `½ Σ f²` over unordered pairs.
    pub regularizer: f64,
}

impl FlowSolution {
    /// Number of stations in the model.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Position of the pair `{i, j}` in [`FlowSolution::flows`].
    #[must_use]
    pub fn pair_index(&self, i: usize, j: usize) -> Option<usize> {
        model::pair_index(self.stations.len(), i, j)
    }

    /// Flow from `from` to `to`; `None` for unknown stations or `from == to`.
    #[must_use]
    pub fn flow(&self, from: &StationKey, to: &StationKey) -> Option<f64> {
        let i = self.stations.iter().position(|k| k == from)?;
        let j = self.stations.iter().position(|k| k == to)?;
        self.pair_index(i, j).map(|p| self.flows[p])
    }

    /// Total flow into the station at position `i`.
    #[must_use]
    pub fn inflow(&self, i: usize) -> f64 {
        (0..self.stations.len())
            .filter_map(|j| self.pair_index(i, j))
            .map(|p| self.flows[p])
            .sum()
    }

    /// `(from, to, flow)` for every ordered pair of distinct stations, in
    /// input order.
    pub fn rows(&self) -> impl Iterator<Item = (&StationKey, &StationKey, f64)> + '_ {
        let n = self.stations.len();
        (0..n).flat_map(move |i| {
            (0..n).filter_map(move |j| {
                self.pair_index(i, j)
                    .map(|p| (&self.stations[i], &self.stations[j], self.flows[p]))
            })
        })
    }
}
