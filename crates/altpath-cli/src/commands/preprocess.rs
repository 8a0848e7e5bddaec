//! `preprocess` command: compute landmark distances and write the cache.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::info;

use altpath_lib::landmarks::cache;
use altpath_lib::{build, EngineConfig};

use crate::commands::{load_edges, resolve_map};

/// Arguments for the preprocess command.
#[derive(Debug, Clone, Default)]
pub struct PreprocessArgs {
    pub map: Option<PathBuf>,
    /// Overrides `landmark_count`.
    pub landmarks: Option<u32>,
    /// Overrides `landmark_cache_path`.
    pub cache: Option<PathBuf>,
}

/// Build the landmark table and save it.
///
/// When fewer landmarks than requested could be placed and a configuration
/// file was given, the achieved count is written back to that file.
pub fn handle_preprocess(
    config_path: Option<&Path>,
    config: &EngineConfig,
    args: &PreprocessArgs,
) -> Result<()> {
    let map = resolve_map(args.map.as_deref(), config)?;
    let cache_path = args
        .cache
        .clone()
        .or_else(|| config.landmark_cache_path.clone())
        .ok_or_else(|| anyhow!("no cache path given: pass --cache or set landmark_cache_path"))?;

    let edges = load_edges(&map)?;

    // Always recompute; an existing cache is overwritten below.
    let mut build_config = EngineConfig {
        use_landmarks: true,
        landmark_count: args.landmarks.unwrap_or(config.landmark_count),
        persist_landmarks: false,
        landmark_cache_path: None,
        ..config.clone()
    };
    let requested = build_config.landmark_count;
    let (graph, table) = build(&edges, &mut build_config).context("failed to build graph")?;
    let table = table.ok_or_else(|| anyhow!("landmark preprocessing produced no table"))?;

    cache::save(&table, &graph, &cache_path)
        .with_context(|| format!("failed to write landmark cache to {}", cache_path.display()))?;

    println!(
        "Computed {} landmarks for {} nodes ({} requested)",
        table.landmark_count(),
        graph.node_count(),
        requested
    );
    println!("Landmark cache written to {}", cache_path.display());

    let achieved = build_config.landmark_count;
    if achieved < requested {
        if let Some(path) = config_path {
            let updated = EngineConfig {
                landmark_count: achieved,
                ..config.clone()
            };
            updated
                .save(path)
                .with_context(|| format!("failed to update configuration {}", path.display()))?;
            info!(path = %path.display(), achieved, "landmark count written back to configuration");
            println!("Updated landmark_count to {} in {}", achieved, path.display());
        }
    }

    Ok(())
}
