//! `check` command: validate an edge list and report its shape.

use std::io;
use std::path::Path;

use anyhow::{bail, Result};
use tracing::error;

use altpath_lib::{
    check_connectivity, check_integrity, EngineConfig, Graph, GraphStats, LandmarkTable,
};

use crate::commands::{load_edges, resolve_map};
use crate::output::{CheckOutput, OutputFormat};

/// Run both checks, print the report, and fail if either check failed.
pub fn handle_check(map: Option<&Path>, config: &EngineConfig, format: OutputFormat) -> Result<()> {
    let path = resolve_map(map, config)?;
    let edges = load_edges(&path)?;

    let integrity = check_integrity(&edges);
    if let Err(e) = &integrity {
        error!(error = %e, "integrity check failed");
    }
    let connectivity = check_connectivity(&edges);
    if let Err(e) = &connectivity {
        error!(error = %e, "connectivity check failed");
    }

    let graph = Graph::from_edges(&edges);
    let landmark_bytes = if config.use_landmarks {
        LandmarkTable::estimated_footprint(graph.node_count(), config.landmark_count as usize)
    } else {
        0
    };

    let output = CheckOutput {
        stats: GraphStats::from_edges(&edges, config.bidirectional_min_degree),
        integrity: integrity.is_ok(),
        connected: connectivity.is_ok(),
        memory: graph.memory_footprint(),
        landmark_bytes,
    };
    output.render(format, &mut io::stdout().lock())?;

    if let Err(e) = integrity.and(connectivity) {
        bail!("edge list {} failed validation: {e}", path.display());
    }
    Ok(())
}
