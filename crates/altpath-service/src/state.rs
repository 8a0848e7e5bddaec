//! Application state shared by all handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use altpath_lib::{
    check_connectivity, check_integrity, read_edges, EngineConfig, Error as LibError, PathFinder,
};

/// Default HTTP port when `SERVICE_PORT` is unset or invalid.
pub const DEFAULT_PORT: u16 = 8080;

/// Error during application state initialization.
#[derive(Debug, Error)]
pub enum AppStateError {
    #[error("edge list not found: {0}")]
    MapNotFound(String),

    #[error("no edge list configured: set ALTPATH_MAP_PATH or map_path")]
    MapNotConfigured,

    #[error("failed to load configuration: {0}")]
    Config(#[source] LibError),

    #[error("failed to load edge list: {0}")]
    Dataset(#[source] LibError),
}

/// Startup settings read from the environment.
///
/// - `ALTPATH_CONFIG`: TOML engine configuration (optional)
/// - `ALTPATH_MAP_PATH`: edge list, overriding `map_path` from the configuration
/// - `SERVICE_PORT`: HTTP port (default: 8080)
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub config: EngineConfig,
    pub map_path: PathBuf,
    pub port: u16,
}

impl ServiceSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, AppStateError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppStateError> {
        let config = match lookup("ALTPATH_CONFIG") {
            Some(path) => EngineConfig::load(Path::new(&path)).map_err(AppStateError::Config)?,
            None => EngineConfig::default(),
        };
        let map_path = lookup("ALTPATH_MAP_PATH")
            .map(PathBuf::from)
            .or_else(|| config.map_path.clone())
            .ok_or(AppStateError::MapNotConfigured)?;
        let port = lookup("SERVICE_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            config,
            map_path,
            port,
        })
    }
}

/// Shared application state for all axum handlers.
///
/// Cheaply cloneable; the graph, landmark table, and buffer pool live behind
/// one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    finder: PathFinder,
    loaded_at: DateTime<Utc>,
}

impl AppState {
    /// Load, validate, and preprocess an edge list.
    ///
    /// Fails when the file is missing, unreadable, has duplicate edges, or is
    /// not connected.
    pub fn load(map_path: impl AsRef<Path>, config: EngineConfig) -> Result<Self, AppStateError> {
        let map_path = map_path.as_ref();
        if !map_path.exists() {
            return Err(AppStateError::MapNotFound(map_path.display().to_string()));
        }

        tracing::info!(path = %map_path.display(), "loading edge list");
        let edges = read_edges(map_path).map_err(AppStateError::Dataset)?;
        check_integrity(&edges).map_err(AppStateError::Dataset)?;
        check_connectivity(&edges).map_err(AppStateError::Dataset)?;

        let finder = PathFinder::from_edges(&edges, config).map_err(AppStateError::Config)?;
        tracing::info!(
            nodes = finder.graph().node_count(),
            landmarks = finder.landmarks().map_or(0, |t| t.landmark_count()),
            lanes = finder.lanes(),
            "graph ready"
        );
        Ok(Self::from_finder(finder))
    }

    /// Wrap an already prepared path finder.
    pub fn from_finder(finder: PathFinder) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                finder,
                loaded_at: Utc::now(),
            }),
        }
    }

    /// Shared query engine.
    pub fn finder(&self) -> &PathFinder {
        &self.inner.finder
    }

    /// When the map finished loading.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.inner.loaded_at
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("node_count", &self.inner.finder.graph().node_count())
            .field("has_landmarks", &self.inner.finder.landmarks().is_some())
            .finish()
    }
}
