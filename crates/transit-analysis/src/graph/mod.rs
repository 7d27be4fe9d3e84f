//! Station graph model.
//!
//! # Overview
//!
//! An undirected, weighted petgraph `StableUnGraph` whose nodes are
//! [`Station`](transit_core::Station)s and whose edge weights are ridership
//! counts (origin–destination network) or track-level totals (physical
//! network). Stable indices let the simulator remove stations from a working
//! copy without invalidating the indices of the survivors.
//!
//! ## Pipeline
//!
//! ```text
//! node table + edge table
//!        ↓  build::TransitGraph::load()
//! TransitGraph (canonical, read-only after load)
//!        ├─ paths: components, shortest paths, efficiency
//!        ├─ stats::GraphSummary::from_graph()
//!        └─ clone() → working copy for attack runs
//! ```
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use transit_analysis::graph::{TransitGraph, GraphSummary};
//! use transit_core::config::DuplicateEdgePolicy;
//!
//! let graph = TransitGraph::load(stations, &edges, DuplicateEdgePolicy::LastWins)?;
//! let summary = GraphSummary::from_graph(&graph, true);
//! println!("stations={} tracks={} efficiency={:.3}",
//!     summary.station_count, summary.track_count, summary.global_efficiency);
//! ```

pub mod build;
pub mod paths;
pub mod stats;

pub use build::TransitGraph;
pub use stats::GraphSummary;
