//! `route` command: answer a single shortest-path query.

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use altpath_lib::{EngineConfig, NodeId, PathFinder, SearchEngine};

use crate::commands::{load_edges, resolve_map};
use crate::output::{OutputFormat, RouteOutput};

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    pub map: Option<PathBuf>,
    pub from: NodeId,
    pub to: NodeId,
    /// Overrides `default_weight`; must lie in `1.0..=max_weight` with at
    /// most two decimal places.
    pub weight: Option<f64>,
    /// Overrides `search_engine`.
    pub engine: Option<SearchEngine>,
}

/// Build a finder over the map and print one route.
pub fn handle_route(
    config: &EngineConfig,
    args: &RouteCommandArgs,
    format: OutputFormat,
) -> Result<()> {
    let map = resolve_map(args.map.as_deref(), config)?;
    let weight = match args.weight {
        Some(weight) => config.check_weight(weight).context("invalid --weight")?,
        None => config.default_weight,
    };
    let config = EngineConfig {
        default_weight: weight,
        search_engine: args.engine.unwrap_or(config.search_engine),
        // One query needs one lane.
        search_lanes: 1,
        ..config.clone()
    };

    let edges = load_edges(&map)?;
    let finder = PathFinder::from_edges(&edges, config).context("failed to prepare graph")?;

    let result = finder.query_default(args.from, args.to);
    if !result.is_found() {
        bail!("no path found from {} to {}", args.from, args.to);
    }

    let output = RouteOutput {
        start: args.from,
        end: args.to,
        engine: finder.config().search_engine,
        weight: finder.config().default_weight,
        result,
    };
    output.render(format, &mut io::stdout().lock())?;
    Ok(())
}
