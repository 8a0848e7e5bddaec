use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use altpath_cli::commands::check::handle_check;
use altpath_cli::commands::init_config::handle_init_config;
use altpath_cli::commands::preprocess::{handle_preprocess, PreprocessArgs};
use altpath_cli::commands::route::{handle_route, RouteCommandArgs};
use altpath_cli::commands::load_config;
use altpath_cli::logging::{init_tracing, LogFormat};
use altpath_cli::output::OutputFormat;
use altpath_lib::{NodeId, SearchEngine};

#[derive(Parser, Debug)]
#[command(author, version, about = "Shortest paths over weighted edge lists with ALT landmarks")]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log line format written to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate an edge list and print statistics and recommendations.
    Check {
        /// Edge list CSV (`node_a,node_b,cost`).
        #[arg(long)]
        map: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Compute landmark distances and write the landmark cache.
    Preprocess {
        #[arg(long)]
        map: Option<PathBuf>,
        /// Number of landmarks to select.
        #[arg(long)]
        landmarks: Option<u32>,
        /// Landmark cache file to write.
        #[arg(long)]
        cache: Option<PathBuf>,
    },
    /// Find the shortest path between two node ids.
    Route {
        #[arg(long)]
        map: Option<PathBuf>,
        /// Start node id.
        #[arg(long = "from")]
        from: NodeId,
        /// End node id.
        #[arg(long = "to")]
        to: NodeId,
        /// Heuristic weight (>= 1.0); larger is faster but less exact.
        #[arg(long)]
        weight: Option<f64>,
        /// Search engine: `uni` or `bi`.
        #[arg(long)]
        engine: Option<SearchEngine>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Write a configuration file with default values.
    InitConfig {
        path: PathBuf,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config_path = cli.config.as_deref();
    let config = || load_config(config_path);

    match cli.command {
        Command::InitConfig { path, force } => handle_init_config(&path, force),
        Command::Check { map, format } => handle_check(map.as_deref(), &config()?, format),
        Command::Preprocess {
            map,
            landmarks,
            cache,
        } => handle_preprocess(
            config_path,
            &config()?,
            &PreprocessArgs {
                map,
                landmarks,
                cache,
            },
        ),
        Command::Route {
            map,
            from,
            to,
            weight,
            engine,
            format,
        } => handle_route(
            &config()?,
            &RouteCommandArgs {
                map,
                from,
                to,
                weight,
                engine,
            },
            format,
        ),
    }
}
