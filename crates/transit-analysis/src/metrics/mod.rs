//! Centrality metrics for the station graph.
//!
//! # Overview
//!
//! Each metric answers a different question about station importance:
//!
//! - **Degree** (`degree`): How much traffic does a station handle? Weighted
//!   degree sums the ridership on incident edges.
//! - **Betweenness** (`betweenness`): Which stations sit on many shortest
//!   routes between other stations?
//! - **Closeness** (`closeness`): Which stations reach the rest of the
//!   network in the fewest hops?
//!
//! [`ranking`] turns any of these score maps into a descending, stably
//! tie-broken [`ranking::Ranking`]. The same ranking feeds the top-k tables
//! and the removal order of the matching attack strategy, so the two can
//! never disagree.
//!
//! # Usage
//!
//! ```rust,ignore
//! use transit_analysis::metrics::ranking::{rank_by_betweenness, rank_by_closeness, rank_by_degree};
//!
//! let by_degree = rank_by_degree(&od_graph, true);
//! let by_betweenness = rank_by_betweenness(&pn_graph, true);
//! let by_closeness = rank_by_closeness(&pn_graph);
//! for entry in by_betweenness.top(10) {
//!     println!("{} {} {:.4}", entry.rank, entry.key, entry.score);
//! }
//! ```

pub mod betweenness;
pub mod closeness;
pub mod degree;
pub mod ranking;
