//! Pair indexing and input checks for the flow model.

use std::collections::HashSet;

use transit_core::{AnalysisError, SolverStatus, StationKey};

use super::FlowTarget;

/// Position of the unordered pair `{i, j}` among the `n (n - 1) / 2` pairs
/// of `n` stations, ordered `{0,1}, {0,2}, …, {1,2}, …`.
pub(super) fn pair_index(n: usize, i: usize, j: usize) -> Option<usize> {
    if i == j || i >= n || j >= n {
        return None;
    }
    let (lo, hi) = if i < j { (i, j) } else { (j, i) };
    Some(lo * (2 * n - lo - 1) / 2 + (hi - lo - 1))
}

/// Validated flow model: station order, targets and pair endpoints.
#[derive(Debug, Clone)]
pub(super) struct FlowModel {
    pub stations: Vec<StationKey>,
    pub targets: Vec<f64>,
    /// Endpoints of every unordered pair, in [`pair_index`] order.
    pub pairs: Vec<(usize, usize)>,
}

impl FlowModel {
    /// Check the targets and build the pair list.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::MalformedInput`] for duplicate stations or targets
    /// that are negative or not finite; [`AnalysisError::InfeasibleModel`]
    /// when no flow can meet the targets.
    pub fn build(targets: &[FlowTarget]) -> Result<Self, AnalysisError> {
        let mut seen: HashSet<&StationKey> = HashSet::with_capacity(targets.len());
        for target in targets {
            if !seen.insert(&target.key) {
                return Err(AnalysisError::malformed(format!(
                    "duplicate station `{}` in flow targets",
                    target.key
                )));
            }
            if !target.target_inflow.is_finite() || target.target_inflow < 0.0 {
                return Err(AnalysisError::malformed(format!(
                    "station `{}` has invalid target {}",
                    target.key, target.target_inflow
                )));
            }
        }

        let values: Vec<f64> = targets.iter().map(|t| t.target_inflow).collect();
        check_feasible(targets, &values)?;

        let n = values.len();
        let pairs = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();

        Ok(Self {
            stations: targets.iter().map(|t| t.key.clone()).collect(),
            targets: values,
            pairs,
        })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }
}

fn infeasible(reason: String) -> AnalysisError {
    AnalysisError::infeasible(SolverStatus::Infeasible, reason)
}

fn check_feasible(targets: &[FlowTarget], values: &[f64]) -> Result<(), AnalysisError> {
    let n = values.len();
    match n {
        0 => return Err(infeasible("model has no stations".to_string())),
        1 => {
            return if values[0] == 0.0 {
                Ok(())
            } else {
                Err(infeasible(format!(
                    "station `{}` has no partner to receive {} from",
                    targets[0].key, values[0]
                )))
            };
        }
        _ => {}
    }

    // Each station takes at least one unit from every other station.
    let floor = (n - 1) as f64;
    if let Some(short) = targets.iter().find(|t| t.target_inflow < floor) {
        return Err(infeasible(format!(
            "station `{}` targets {} but at least {floor} must flow in",
            short.key, short.target_inflow
        )));
    }

    if n == 2 {
        return if values[0] == values[1] {
            Ok(())
        } else {
            Err(infeasible(format!(
                "two stations need equal targets, got {} and {}",
                values[0], values[1]
            )))
        };
    }

    let excess: Vec<f64> = values.iter().map(|t| t - floor).collect();
    let total: f64 = excess.iter().sum();
    let slack = 1e-9 * total.max(1.0);
    for (target, &e) in targets.iter().zip(&excess) {
        if e > total - e + slack {
            return Err(infeasible(format!(
                "station `{}` needs {e} beyond the unit flows but the others can supply only {}",
                target.key,
                total - e
            )));
        }
    }
    Ok(())
}
