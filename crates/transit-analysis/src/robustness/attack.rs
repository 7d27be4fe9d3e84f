//! Attack simulation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, info, instrument};
use transit_core::{AnalysisError, StationKey};

use super::{AttackOptions, AttackRun, AttackStrategy, RobustnessSample};
use crate::graph::TransitGraph;
use crate::metrics::ranking::{rank, RankingOptions};

/// Order in which `strategy` removes the stations of `graph`.
///
/// `seed` drives the random strategy and is ignored by the others. The
/// result is a permutation of every station in the graph.
#[must_use]
pub fn removal_order(
    graph: &TransitGraph,
    strategy: AttackStrategy,
    ranking: RankingOptions,
    seed: u64,
) -> Vec<StationKey> {
    match strategy.centrality() {
        Some(centrality) => rank(graph, centrality, ranking).order(),
        None => {
            let mut keys: Vec<StationKey> = graph
                .node_indices()
                .filter_map(|idx| graph.key(idx).cloned())
                .collect();
            let mut rng = StdRng::seed_from_u64(seed);
            keys.shuffle(&mut rng);
            keys
        }
    }
}

/// Run one attack against a working copy of `graph`.
///
/// # Errors
///
/// Returns [`AnalysisError::MalformedInput`] if `options.fraction` is not a
/// positive number, and [`AnalysisError::DegenerateGraph`] if the graph has
/// no stations.
#[instrument(skip(graph, options), fields(stations = graph.node_count()))]
pub fn simulate(
    graph: &TransitGraph,
    strategy: AttackStrategy,
    options: &AttackOptions,
) -> Result<AttackRun, AnalysisError> {
    let fraction =
        checked_fraction(options.fraction).map_err(|e| in_run(strategy, None, e))?;
    let n = graph.node_count();
    if n == 0 {
        return Err(AnalysisError::degenerate(format!(
            "{strategy} attack on a graph with no stations"
        )));
    }

    let seed = match strategy {
        AttackStrategy::Random => Some(options.seed.unwrap_or_else(rand::random)),
        _ => None,
    };
    let order = removal_order(graph, strategy, options.ranking, seed.unwrap_or_default());
    let removals = removal_count(n, fraction);

    let mut working = graph.clone();
    let mut samples = Vec::with_capacity(removals + 1);

    samples.push(measure(&working, 0, n).map_err(|e| in_run(strategy, Some(0), e))?);
    for (k, key) in order.iter().take(removals).enumerate() {
        let step = k + 1;
        working
            .remove_node(key)
            .map_err(|e| in_run(strategy, Some(step), e))?;
        let sample = measure(&working, step, n).map_err(|e| in_run(strategy, Some(step), e))?;
        debug!(
            step = sample.step,
            station = %key,
            largest = sample.largest_component_fraction,
            "removed station"
        );
        samples.push(sample);
    }

    // The largest component never grows, so the first undefined sample
    // marks the rest of the run.
    let degenerate_from = samples
        .iter()
        .find(|s| s.average_path_length.is_none())
        .map(|s| s.step);

    let last_fraction = samples.last().map_or(0.0, |s| s.largest_component_fraction);
    info!(
        %strategy,
        removed = removals,
        last_fraction,
        ?degenerate_from,
        "attack finished"
    );

    Ok(AttackRun {
        strategy,
        seed,
        node_count: n,
        order: order.into_iter().take(removals).collect(),
        samples,
        degenerate_from,
    })
}

/// Run every [`AttackStrategy`] in parallel, each on its own working copy.
///
/// Runs are returned in [`AttackStrategy::ALL`] order.
///
/// # Errors
///
/// Returns the first error any run produced.
#[instrument(skip(graph, options), fields(stations = graph.node_count()))]
pub fn simulate_all(
    graph: &TransitGraph,
    options: &AttackOptions,
) -> Result<Vec<AttackRun>, AnalysisError> {
    AttackStrategy::ALL
        .par_iter()
        .map(|&strategy| simulate(graph, strategy, options))
        .collect()
}

fn checked_fraction(fraction: f64) -> Result<f64, AnalysisError> {
    if fraction.is_nan() || fraction <= 0.0 {
        return Err(AnalysisError::malformed(format!(
            "attack fraction must be positive, got {fraction}"
        )));
    }
    Ok(fraction.min(1.0))
}

/// Prefix an error raised inside a run with the strategy and step.
fn in_run(strategy: AttackStrategy, step: Option<usize>, err: AnalysisError) -> AnalysisError {
    let place = match step {
        Some(k) => format!("{strategy} attack, step {k}"),
        None => format!("{strategy} attack"),
    };
    match err {
        AnalysisError::MalformedInput { context } => {
            AnalysisError::malformed(format!("{place}: {context}"))
        }
        AnalysisError::DegenerateGraph { context } => {
            AnalysisError::degenerate(format!("{place}: {context}"))
        }
        other => other,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn removal_count(n: usize, fraction: f64) -> usize {
    ((n as f64 * fraction).floor() as usize).min(n)
}

fn measure(
    working: &TransitGraph,
    step: usize,
    n: usize,
) -> Result<RobustnessSample, AnalysisError> {
    let largest = working.largest_component();
    let (average_path_length, efficiency) = if largest.len() >= 2 {
        (
            Some(working.average_shortest_path_length(&largest)?),
            Some(working.global_efficiency()),
        )
    } else {
        (None, None)
    };

    Ok(RobustnessSample {
        step,
        fraction_removed: step as f64 / n as f64,
        largest_component_fraction: largest.len() as f64 / n as f64,
        average_path_length,
        efficiency,
    })
}
