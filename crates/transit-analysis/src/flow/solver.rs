//! Dual semismooth Newton iteration for the flow model.

use std::time::Instant;

use nalgebra::{DMatrix, DVector};
use tracing::{debug, info, instrument, warn};
use transit_core::{AnalysisError, SolverStatus};

use super::model::{pair_index, FlowModel};
use super::{FlowOptions, FlowSolution, FlowTarget};

/// Diagonal shift keeping the Newton matrix positive definite.
const RIDGE: f64 = 1e-10;
/// Armijo sufficient-increase constant.
const ARMIJO: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 60;

/// Solve the flow model for `targets`.
///
/// # Errors
///
/// - [`AnalysisError::MalformedInput`]: duplicate stations, negative or
///   non-finite targets, or a non-positive tolerance.
/// - [`AnalysisError::InfeasibleModel`]: no flow meets the targets
///   (status `Infeasible`), or the iteration limit was reached (status
///   `IterationLimit`).
/// - [`AnalysisError::SolverTimeout`]: the solve ran past `options.timeout`.
#[instrument(skip(targets, options), fields(stations = targets.len()))]
pub fn solve(targets: &[FlowTarget], options: &FlowOptions) -> Result<FlowSolution, AnalysisError> {
    if !options.tolerance.is_finite() || options.tolerance <= 0.0 {
        return Err(AnalysisError::malformed(format!(
            "solver tolerance must be positive, got {}",
            options.tolerance
        )));
    }

    let model = FlowModel::build(targets)?;
    let n = model.len();
    info!(stations = n, pairs = model.pairs.len(), "solving flow model");

    let start = Instant::now();
    let scale = model.targets.iter().copied().fold(1.0_f64, f64::max);
    let threshold = options.tolerance * scale;
    let t = DVector::from_column_slice(&model.targets);

    let denom = n.saturating_sub(1).max(1) as f64;
    let mut lambda = t.map(|ti| ti / (2.0 * denom));
    let mut iterations = 0usize;

    loop {
        let sums = pair_sums(&model, &lambda);
        let flows: Vec<f64> = sums.iter().map(|&s| s.max(1.0)).collect();
        let gradient = &t - inflows(&model, &flows);
        let residual = gradient.amax();

        if residual <= threshold {
            info!(iterations, residual, "flow model solved");
            return Ok(finish(model, flows, iterations, residual));
        }

        let elapsed = start.elapsed();
        if elapsed >= options.timeout {
            warn!(iterations, residual, ?elapsed, "flow solver timed out");
            return Err(AnalysisError::SolverTimeout {
                elapsed,
                limit: options.timeout,
            });
        }
        if iterations >= options.max_iterations {
            return Err(AnalysisError::infeasible(
                SolverStatus::IterationLimit,
                format!("no convergence after {iterations} iterations (residual {residual:.3e})"),
            ));
        }

        let current = dual_value(&t, &lambda, &sums);
        let newton = newton_direction(&model, &sums, &gradient);
        let step = newton
            .and_then(|d| line_search(&model, &t, &lambda, current, &gradient, d))
            .or_else(|| line_search(&model, &t, &lambda, current, &gradient, gradient.clone()));

        let Some((alpha, direction)) = step else {
            return Err(AnalysisError::infeasible(
                SolverStatus::IterationLimit,
                format!("line search stalled after {iterations} iterations (residual {residual:.3e})"),
            ));
        };

        lambda += direction * alpha;
        iterations += 1;
        debug!(iterations, residual, alpha, "newton step");
    }
}

/// `λ_i + λ_j` for every pair.
fn pair_sums(model: &FlowModel, lambda: &DVector<f64>) -> Vec<f64> {
    model
        .pairs
        .iter()
        .map(|&(i, j)| lambda[i] + lambda[j])
        .collect()
}

/// `A f`: total flow at each station.
fn inflows(model: &FlowModel, flows: &[f64]) -> DVector<f64> {
    let mut total = DVector::zeros(model.len());
    for (&(i, j), &f) in model.pairs.iter().zip(flows) {
        total[i] += f;
        total[j] += f;
    }
    total
}

/// Dual objective `tᵀλ - Σ ψ(λ_i + λ_j)`.
fn dual_value(t: &DVector<f64>, lambda: &DVector<f64>, sums: &[f64]) -> f64 {
    let penalty: f64 = sums
        .iter()
        .map(|&s| if s >= 1.0 { 0.5 * s * s } else { s - 0.5 })
        .sum();
    t.dot(lambda) - penalty
}

/// Solve `(A_S A_Sᵀ + εI) d = g` over the active pairs.
fn newton_direction(
    model: &FlowModel,
    sums: &[f64],
    gradient: &DVector<f64>,
) -> Option<DVector<f64>> {
    let n = model.len();
    let mut hessian = DMatrix::<f64>::identity(n, n) * RIDGE;
    for (&(i, j), &s) in model.pairs.iter().zip(sums) {
        if s >= 1.0 {
            hessian[(i, i)] += 1.0;
            hessian[(j, j)] += 1.0;
            hessian[(i, j)] += 1.0;
            hessian[(j, i)] += 1.0;
        }
    }

    if let Some(chol) = hessian.clone().cholesky() {
        return Some(chol.solve(gradient));
    }

    debug!("cholesky failed, using pseudo-inverse");
    let pinv = hessian.svd(true, true).pseudo_inverse(1e-12).ok()?;
    Some(pinv * gradient)
}

/// Backtrack along `direction` until the dual rises by the Armijo margin.
fn line_search(
    model: &FlowModel,
    t: &DVector<f64>,
    lambda: &DVector<f64>,
    current: f64,
    gradient: &DVector<f64>,
    direction: DVector<f64>,
) -> Option<(f64, DVector<f64>)> {
    let slope = gradient.dot(&direction);
    if !slope.is_finite() || slope <= 0.0 {
        return None;
    }

    let mut alpha = 1.0;
    for _ in 0..MAX_BACKTRACKS {
        let trial = lambda + &direction * alpha;
        let sums = pair_sums(model, &trial);
        if dual_value(t, &trial, &sums) >= current + ARMIJO * alpha * slope {
            return Some((alpha, direction));
        }
        alpha *= 0.5;
    }
    None
}

fn finish(model: FlowModel, flows: Vec<f64>, iterations: usize, residual: f64) -> FlowSolution {
    let n = model.len();
    let flow_at = |i: usize, j: usize| pair_index(n, i, j).map_or(0.0, |p| flows[p]);

    let mut imbalance = 0.0;
    for i in 0..n {
        for j in 0..n {
            let d = flow_at(i, j) - flow_at(j, i);
            imbalance += d * d;
        }
    }
    let regularizer = 0.5 * flows.iter().map(|f| f * f).sum::<f64>();

    FlowSolution {
        stations: model.stations,
        flows,
        status: SolverStatus::Optimal,
        iterations,
        max_residual: residual,
        imbalance,
        regularizer,
    }
}
