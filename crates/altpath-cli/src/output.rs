//! Output formatting for command results.

use std::io::{self, Write};

use altpath_lib::{GraphStats, MemoryFootprint, NodeId, PathResult, SearchEngine};
use clap::ValueEnum;
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// A finished route query, as printed by `altpath route`.
#[derive(Debug, Clone, Serialize)]
pub struct RouteOutput {
    pub start: NodeId,
    pub end: NodeId,
    pub engine: SearchEngine,
    pub weight: f64,
    #[serde(flatten)]
    pub result: PathResult,
}

impl RouteOutput {
    /// Write the route in the requested format.
    pub fn render<W: Write>(&self, format: OutputFormat, out: &mut W) -> io::Result<()> {
        match format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, self)?;
                writeln!(out)
            }
            OutputFormat::Text => self.render_text(out),
        }
    }

    fn render_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "Path from {} to {} (engine: {}, weight: {}):",
            self.start, self.end, self.engine, self.weight
        )?;
        if self.result.path.is_empty() {
            writeln!(out, "  (start and end are the same node)")?;
        } else {
            let steps: Vec<String> = self.result.path.iter().map(ToString::to_string).collect();
            writeln!(out, "  {}", steps.join(" -> "))?;
        }
        writeln!(out, "Total cost: {}", self.result.total_cost)?;
        writeln!(out, "Nodes: {}", self.result.node_count)
    }
}

/// Statistics and check results printed by `altpath check`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutput {
    #[serde(flatten)]
    pub stats: GraphStats,
    pub integrity: bool,
    pub connected: bool,
    /// Estimated size of the in-memory graph.
    pub memory: MemoryFootprint,
    /// Estimated size of the landmark table for the configured count, zero
    /// when landmarks are disabled.
    pub landmark_bytes: usize,
}

impl CheckOutput {
    /// Write the check report in the requested format.
    pub fn render<W: Write>(&self, format: OutputFormat, out: &mut W) -> io::Result<()> {
        if format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut *out, self)?;
            return writeln!(out);
        }

        let stats = &self.stats;
        writeln!(out, "Nodes: {}", stats.nodes)?;
        writeln!(out, "Edges: {}", stats.edges)?;
        writeln!(out, "Density: {:.6}", stats.density)?;
        writeln!(out, "Average degree: {:.2}", stats.average_degree)?;
        writeln!(out, "Integrity check: {}", pass_fail(self.integrity))?;
        writeln!(out, "Connectivity check: {}", pass_fail(self.connected))?;
        writeln!(
            out,
            "Estimated memory: {} (id map {}, id table {}, offsets {}, edges {}, landmarks {})",
            format_bytes(self.memory.total() + self.landmark_bytes),
            format_bytes(self.memory.id_map),
            format_bytes(self.memory.id_table),
            format_bytes(self.memory.offsets),
            format_bytes(self.memory.edges),
            format_bytes(self.landmark_bytes)
        )?;
        writeln!(
            out,
            "Recommended: landmarks {}, {} search",
            if stats.recommend_landmarks { "on" } else { "optional" },
            stats.recommended_engine
        )
    }
}

/// Render a byte count with a binary unit, e.g. `1.5 MiB`.
fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn pass_fail(ok: bool) -> &'static str {
    if ok {
        "passed"
    } else {
        "FAILED"
    }
}
