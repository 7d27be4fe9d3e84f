use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    MalformedInput,
    DegenerateGraph,
    InfeasibleModel,
    SolverTimeout,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MalformedInput => "E1001",
            Self::DegenerateGraph => "E2001",
            Self::InfeasibleModel => "E3001",
            Self::SolverTimeout => "E3002",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::MalformedInput => {
                Some("Check station keys, weight columns and literal-encoded fields.")
            }
            Self::DegenerateGraph => None,
            Self::InfeasibleModel => Some(
                "Every target must be at least (stations - 1) and no station may exceed the combined excess of the others.",
            ),
            Self::SolverTimeout => {
                Some("Retry with a longer --timeout-secs or fewer stations.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Terminal status reported by the flow solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    Optimal,
    Infeasible,
    IterationLimit,
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Optimal => "optimal",
            Self::Infeasible => "infeasible",
            Self::IterationLimit => "iteration_limit",
        };
        f.write_str(s)
    }
}

/// Domain errors raised by the graph model, the simulator and the solver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// A path-length style metric was requested on a graph that is too
    /// small or fully fragmented.
    #[error("degenerate graph: {context}")]
    DegenerateGraph { context: String },

    /// The flow constraints cannot be satisfied.
    #[error("infeasible flow model (status {status}): {reason}")]
    InfeasibleModel { status: SolverStatus, reason: String },

    /// The solver ran past its wall-clock limit.
    #[error("flow solver timed out after {elapsed:?} (limit {limit:?})")]
    SolverTimeout { elapsed: Duration, limit: Duration },

    /// Missing or duplicate identifiers, negative weights, bad literals or
    /// out-of-range parameters.
    #[error("malformed input: {context}")]
    MalformedInput { context: String },
}

impl AnalysisError {
    pub fn degenerate(context: impl Into<String>) -> Self {
        Self::DegenerateGraph {
            context: context.into(),
        }
    }

    pub fn malformed(context: impl Into<String>) -> Self {
        Self::MalformedInput {
            context: context.into(),
        }
    }

    pub fn infeasible(status: SolverStatus, reason: impl Into<String>) -> Self {
        Self::InfeasibleModel {
            status,
            reason: reason.into(),
        }
    }

    /// The machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DegenerateGraph { .. } => ErrorCode::DegenerateGraph,
            Self::InfeasibleModel { .. } => ErrorCode::InfeasibleModel,
            Self::SolverTimeout { .. } => ErrorCode::SolverTimeout,
            Self::MalformedInput { .. } => ErrorCode::MalformedInput,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalysisError, ErrorCode, SolverStatus};
    use std::collections::HashSet;
    use std::time::Duration;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::MalformedInput,
            ErrorCode::DegenerateGraph,
            ErrorCode::InfeasibleModel,
            ErrorCode::SolverTimeout,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::InfeasibleModel.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn errors_map_to_codes() {
        assert_eq!(
            AnalysisError::malformed("x").code(),
            ErrorCode::MalformedInput
        );
        assert_eq!(
            AnalysisError::degenerate("x").code(),
            ErrorCode::DegenerateGraph
        );
        let timeout = AnalysisError::SolverTimeout {
            elapsed: Duration::from_secs(2),
            limit: Duration::from_secs(1),
        };
        assert_eq!(timeout.code(), ErrorCode::SolverTimeout);
    }

    #[test]
    fn every_code_is_raised_by_some_error() {
        let errors = [
            AnalysisError::malformed("x"),
            AnalysisError::degenerate("x"),
            AnalysisError::infeasible(SolverStatus::Infeasible, "x"),
            AnalysisError::SolverTimeout {
                elapsed: Duration::from_secs(2),
                limit: Duration::from_secs(1),
            },
        ];
        let raised: HashSet<ErrorCode> = errors.iter().map(AnalysisError::code).collect();
        assert_eq!(raised.len(), 4);
    }

    #[test]
    fn infeasible_message_names_status() {
        let err = AnalysisError::infeasible(SolverStatus::IterationLimit, "no convergence");
        let msg = err.to_string();
        assert!(msg.contains("iteration_limit"), "got {msg}");
        assert!(msg.contains("no convergence"), "got {msg}");
    }
}
