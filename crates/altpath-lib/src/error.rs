use std::path::PathBuf;

use thiserror::Error;

use crate::graph::NodeId;

/// Convenient result alias for the altpath library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Queries never fail with this type: an unreachable or unknown node is reported
/// through [`crate::PathResult::no_path`]. These variants cover dataset ingestion,
/// validation, and configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when an edge list path does not carry a `.csv` extension.
    #[error("edge list {path} is not a .csv file")]
    NotCsv { path: PathBuf },

    /// Raised when an edge list contained no usable rows.
    #[error("edge list {path} contained no valid edges")]
    EmptyDataset { path: PathBuf },

    /// Raised when the same undirected edge appears more than once.
    #[error("duplicate edge between {a} and {b} (edge #{position})")]
    DuplicateEdge {
        a: NodeId,
        b: NodeId,
        position: usize,
    },

    /// Raised when the edge list does not form a single connected component.
    #[error("graph is not connected: found {components} components")]
    Disconnected { components: usize },

    /// Raised when configuration values are out of range or inconsistent.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Raised when a configuration file cannot be parsed.
    #[error("failed to parse configuration {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Raised when a configuration cannot be serialized.
    #[error("failed to serialize configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Raised when a per-query weight is rejected by the override policy.
    #[error("invalid weight {weight}: {reason}")]
    InvalidWeight { weight: f64, reason: String },

    /// Raised when a landmark cache file is missing, truncated, or stale.
    #[error("failed to load landmark cache from {path}: {message}")]
    LandmarkCacheLoad { path: PathBuf, message: String },

    /// Wrapper for CSV reader errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
