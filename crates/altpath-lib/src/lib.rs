//! altpath library entry points.
//!
//! This crate loads weighted undirected edge lists, builds a compact CSR graph,
//! precomputes ALT landmark distances, and answers shortest-path queries with
//! either a unidirectional or a concurrent bidirectional A* search. Higher-level
//! consumers (CLI, HTTP service) should only depend on the functions exported
//! here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod graph;
pub mod heuristic;
pub mod landmarks;
pub mod search;

pub use config::EngineConfig;
pub use dataset::{check_connectivity, check_integrity, read_edges, GraphStats};
pub use engine::{build, PathFinder};
pub use error::{Error, Result};
pub use graph::{EdgeRecord, Graph, MemoryFootprint, NodeId};
pub use heuristic::Heuristic;
pub use landmarks::LandmarkTable;
pub use search::{PathResult, SearchEngine, SearchLimits};
