#![forbid(unsafe_code)]
//! transit-core library.
//!
//! Shared building blocks for the analysis engines: the value-typed
//! [`StationKey`](model::StationKey), literal-encoded tabular input, the
//! [`AnalysisError`](error::AnalysisError) taxonomy and the TOML
//! configuration layer.
//!
//! # Conventions
//!
//! - **Errors**: Typed [`error::AnalysisError`] for domain failures,
//!   `anyhow::Result` with context at I/O boundaries.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod literal;
pub mod model;
pub mod table;

pub use error::{AnalysisError, ErrorCode, SolverStatus};
pub use model::{Station, StationKey};
