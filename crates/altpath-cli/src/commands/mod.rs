// Module exports for CLI subcommands
//
// Each module handles one subcommand. main.rs parses arguments and dispatches
// to these handlers.

pub mod check;
pub mod init_config;
pub mod preprocess;
pub mod route;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use altpath_lib::{read_edges, EdgeRecord, EngineConfig};

/// Load the configuration file if one was given, otherwise the defaults.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Pick the edge list from the command line, falling back to `map_path`.
pub fn resolve_map(map: Option<&Path>, config: &EngineConfig) -> Result<PathBuf> {
    map.or(config.map_path.as_deref())
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            anyhow!("no edge list given: pass --map or set map_path in the configuration")
        })
}

/// Read an edge list, adding the path to any error.
pub fn load_edges(path: &Path) -> Result<Vec<EdgeRecord>> {
    read_edges(path).with_context(|| format!("failed to load edge list from {}", path.display()))
}
