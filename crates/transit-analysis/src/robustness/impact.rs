//! Impact of removing a hand-picked set of stations.
//!
//! Unlike an attack run, the largest-component fraction here is relative to
//! the stations still present after each removal, and a path length that
//! cannot be measured counts as `0.0`. The report compares the intact
//! network with the state after the last removal.

use serde::Serialize;
use tracing::{info, instrument};
use transit_core::{AnalysisError, StationKey};

use crate::graph::TransitGraph;

/// Metrics of the working graph at one point of an impact assessment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactSnapshot {
    pub efficiency: f64,
    pub average_path_length: f64,
    pub largest_component_fraction: f64,
}

impl ImpactSnapshot {
    fn measure(graph: &TransitGraph) -> Self {
        let largest = graph.largest_component();
        let n = graph.node_count();
        let largest_component_fraction = if n == 0 {
            0.0
        } else {
            largest.len() as f64 / n as f64
        };
        Self {
            efficiency: graph.global_efficiency(),
            average_path_length: graph.average_shortest_path_length(&largest).unwrap_or(0.0),
            largest_component_fraction,
        }
    }
}

/// Final value of a metric and how far it moved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricChange {
    pub initial: f64,
    pub value: f64,
    /// Percent change from `initial` to `value`; `None` when `initial` is 0.
    pub percent_change: Option<f64>,
}

impl MetricChange {
    fn between(initial: f64, value: f64) -> Self {
        let percent_change = (initial != 0.0).then(|| (value - initial) / initial * 100.0);
        Self {
            initial,
            value,
            percent_change,
        }
    }
}

/// Outcome of [`assess_impact`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactReport {
    /// Stations removed, in removal order.
    pub removed: Vec<StationKey>,
    /// Intact network followed by one snapshot per removal.
    pub snapshots: Vec<ImpactSnapshot>,
    pub efficiency: MetricChange,
    pub average_path_length: MetricChange,
    pub largest_component_fraction: MetricChange,
}

/// Remove `selected` from a copy of `graph`, in order, and report the
/// change in efficiency, path length and largest-component fraction.
///
/// # Errors
///
/// Returns [`AnalysisError::MalformedInput`] if `selected` is empty, names a
/// station that is not in the graph, or names a station twice.
#[instrument(skip(graph, selected), fields(selected = selected.len()))]
pub fn assess_impact(
    graph: &TransitGraph,
    selected: &[StationKey],
) -> Result<ImpactReport, AnalysisError> {
    if selected.is_empty() {
        return Err(AnalysisError::malformed(
            "impact assessment needs at least one station",
        ));
    }

    let mut working = graph.clone();
    let mut snapshots = Vec::with_capacity(selected.len() + 1);
    snapshots.push(ImpactSnapshot::measure(&working));

    for key in selected {
        working.remove_node(key)?;
        snapshots.push(ImpactSnapshot::measure(&working));
    }

    let initial = snapshots[0];
    let last = snapshots[snapshots.len() - 1];
    let report = ImpactReport {
        removed: selected.to_vec(),
        efficiency: MetricChange::between(initial.efficiency, last.efficiency),
        average_path_length: MetricChange::between(
            initial.average_path_length,
            last.average_path_length,
        ),
        largest_component_fraction: MetricChange::between(
            initial.largest_component_fraction,
            last.largest_component_fraction,
        ),
        snapshots,
    };

    info!(
        removed = report.removed.len(),
        efficiency = report.efficiency.value,
        largest = report.largest_component_fraction.value,
        "impact assessed"
    );
    Ok(report)
}
