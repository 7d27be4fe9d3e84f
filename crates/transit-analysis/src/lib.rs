#![forbid(unsafe_code)]
//! transit-analysis library.
//!
//! The two engines of the workspace live here:
//!
//! - [`robustness`]: attack simulation over a [`graph::TransitGraph`],
//!   ordered by the rankings in [`metrics`].
//! - [`flow`]: the flow-conservation solver producing a symmetric,
//!   target-matching flow between every station pair.
//!
//! # Conventions
//!
//! - **Errors**: [`transit_core::AnalysisError`] for domain failures.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod flow;
pub mod graph;
pub mod metrics;
pub mod robustness;

pub use graph::{GraphSummary, TransitGraph};
