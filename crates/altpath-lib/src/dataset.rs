//! Edge-list ingestion and validation.
//!
//! Edge lists are headerless CSV files with three columns `node_a,node_b,cost`.
//! Node ids are non-negative integers and costs are integers `>= 1`. Rows that
//! do not match are skipped with a warning rather than failing the whole load.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::graph::{EdgeRecord, NodeId};
use crate::search::SearchEngine;

/// Graph density below which landmark preprocessing is recommended.
pub const LANDMARK_DENSITY_THRESHOLD: f64 = 1e-4;

/// Load an edge list from a `.csv` file.
///
/// Fails when the extension is not `.csv`, the file cannot be read, or no row
/// is usable.
pub fn read_edges(path: &Path) -> Result<Vec<EdgeRecord>> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !is_csv {
        return Err(Error::NotCsv {
            path: path.to_path_buf(),
        });
    }

    info!(path = %path.display(), "reading edge list");
    let edges = read_edges_from(File::open(path)?)?;
    if edges.is_empty() {
        return Err(Error::EmptyDataset {
            path: path.to_path_buf(),
        });
    }
    Ok(edges)
}

/// Parse edge rows from any reader, skipping malformed rows.
pub fn read_edges_from<R: Read>(reader: R) -> Result<Vec<EdgeRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut edges = Vec::new();
    let mut skipped = 0usize;
    let mut record = StringRecord::new();

    loop {
        match csv_reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {}
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                let line = err.position().map_or(0, |p| p.line());
                warn!(line, error = %err, "unreadable row, skipping");
                skipped += 1;
                continue;
            }
        }

        let line = record.position().map_or(0, |p| p.line());
        match parse_row(&record) {
            Ok(edge) => edges.push(edge),
            Err(reason) => {
                warn!(line, reason, "invalid edge row, skipping");
                skipped += 1;
            }
        }
    }

    info!(edges = edges.len(), skipped, "edge list loaded");
    Ok(edges)
}

fn parse_row(record: &StringRecord) -> std::result::Result<EdgeRecord, &'static str> {
    if record.len() != 3 {
        return Err("expected 3 columns");
    }
    let field = |index: usize| -> std::result::Result<u32, &'static str> {
        let value = &record[index];
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err("non-integer or negative value");
        }
        value.parse().map_err(|_| "value out of range")
    };

    let a: NodeId = field(0)?;
    let b: NodeId = field(1)?;
    let cost = field(2)?;
    if cost == 0 {
        return Err("cost must be >= 1");
    }
    Ok(EdgeRecord::new(a, b, cost))
}

/// Reject edge lists that contain the same undirected edge twice.
///
/// `(a, b)` and `(b, a)` count as the same edge.
pub fn check_integrity(edges: &[EdgeRecord]) -> Result<()> {
    debug!(edges = edges.len(), "checking edge list integrity");
    let mut seen: HashSet<u64> = HashSet::with_capacity(edges.len());
    for (position, edge) in edges.iter().enumerate() {
        let (low, high) = if edge.a <= edge.b {
            (edge.a, edge.b)
        } else {
            (edge.b, edge.a)
        };
        let key = (u64::from(low) << 32) | u64::from(high);
        if !seen.insert(key) {
            return Err(Error::DuplicateEdge {
                a: low,
                b: high,
                position: position + 1,
            });
        }
    }
    Ok(())
}

/// Reject edge lists that form more than one connected component.
///
/// An empty edge list is considered connected.
pub fn check_connectivity(edges: &[EdgeRecord]) -> Result<()> {
    debug!(edges = edges.len(), "checking edge list connectivity");
    let components = count_components(edges);
    if components > 1 {
        return Err(Error::Disconnected { components });
    }
    Ok(())
}

fn count_components(edges: &[EdgeRecord]) -> usize {
    let mut index: HashMap<NodeId, usize> = HashMap::new();
    let mut sets = DisjointSets::default();
    for edge in edges {
        let a = *index.entry(edge.a).or_insert_with(|| sets.make_set());
        let b = *index.entry(edge.b).or_insert_with(|| sets.make_set());
        sets.union(a, b);
    }
    sets.count()
}

/// Union-find with path halving and union by rank.
#[derive(Debug, Default)]
struct DisjointSets {
    parent: Vec<usize>,
    rank: Vec<u8>,
    count: usize,
}

impl DisjointSets {
    fn make_set(&mut self) -> usize {
        let id = self.parent.len();
        self.parent.push(id);
        self.rank.push(0);
        self.count += 1;
        id
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut a, mut b) = (self.find(a), self.find(b));
        if a == b {
            return;
        }
        if self.rank[a] < self.rank[b] {
            std::mem::swap(&mut a, &mut b);
        }
        self.parent[b] = a;
        if self.rank[a] == self.rank[b] {
            self.rank[a] += 1;
        }
        self.count -= 1;
    }

    fn count(&self) -> usize {
        self.count
    }
}

/// Size and shape of an edge list, with preprocessing recommendations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    /// `edges / (nodes * (nodes - 1) / 2)`, zero for fewer than two nodes.
    pub density: f64,
    /// `2 * edges / nodes`.
    pub average_degree: f64,
    /// Sparse graphs gain the most from landmark heuristics.
    pub recommend_landmarks: bool,
    pub recommended_engine: SearchEngine,
}

impl GraphStats {
    /// Compute statistics; graphs whose average degree is below
    /// `bidirectional_min_degree` are steered to the unidirectional engine.
    pub fn from_edges(edges: &[EdgeRecord], bidirectional_min_degree: f64) -> Self {
        let nodes = edges
            .iter()
            .flat_map(|e| [e.a, e.b])
            .collect::<HashSet<_>>()
            .len();
        let edge_count = edges.len();

        let density = if nodes > 1 {
            let max_edges = nodes as f64 * (nodes as f64 - 1.0) / 2.0;
            edge_count as f64 / max_edges
        } else {
            0.0
        };
        let average_degree = if nodes > 0 {
            2.0 * edge_count as f64 / nodes as f64
        } else {
            0.0
        };
        let recommended_engine = if average_degree < bidirectional_min_degree {
            SearchEngine::Unidirectional
        } else {
            SearchEngine::Bidirectional
        };

        Self {
            nodes,
            edges: edge_count,
            density,
            average_degree,
            recommend_landmarks: density < LANDMARK_DENSITY_THRESHOLD,
            recommended_engine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_rows_and_skips_bad_ones() {
        let data = "1,2,5\n 2 , 3 , 7 \nfoo,4,1\n3,4\n4,5,0\n5,6,-2\n\n6,7,3,9\n7,8,2\n";
        let edges = read_edges_from(Cursor::new(data)).expect("parse");
        assert_eq!(
            edges,
            vec![
                EdgeRecord::new(1, 2, 5),
                EdgeRecord::new(2, 3, 7),
                EdgeRecord::new(7, 8, 2),
            ]
        );
    }

    #[test]
    fn allows_node_zero() {
        let edges = read_edges_from(Cursor::new("0,1,1\n")).expect("parse");
        assert_eq!(edges, vec![EdgeRecord::new(0, 1, 1)]);
    }

    #[test]
    fn rejects_non_csv_extension() {
        let err = read_edges(Path::new("graph.txt")).expect_err("not csv");
        assert!(matches!(err, Error::NotCsv { .. }));
    }

    #[test]
    fn empty_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "x,y,z\n").expect("write");
        assert!(matches!(
            read_edges(&path),
            Err(Error::EmptyDataset { .. })
        ));
    }

    #[test]
    fn integrity_catches_reversed_duplicates() {
        let edges = [
            EdgeRecord::new(1, 2, 1),
            EdgeRecord::new(2, 3, 1),
            EdgeRecord::new(2, 1, 4),
        ];
        match check_integrity(&edges) {
            Err(Error::DuplicateEdge { a, b, position }) => {
                assert_eq!((a, b, position), (1, 2, 3));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(check_integrity(&edges[..2]).is_ok());
    }

    #[test]
    fn connectivity_counts_components() {
        let connected = [EdgeRecord::new(1, 2, 1), EdgeRecord::new(3, 2, 1)];
        assert!(check_connectivity(&connected).is_ok());
        assert!(check_connectivity(&[]).is_ok());

        let split = [
            EdgeRecord::new(1, 2, 1),
            EdgeRecord::new(3, 4, 1),
            EdgeRecord::new(5, 6, 1),
        ];
        assert!(matches!(
            check_connectivity(&split),
            Err(Error::Disconnected { components: 3 })
        ));
    }

    #[test]
    fn stats_recommendations() {
        // A 4-cycle: degree 2, density 4/6.
        let cycle = [
            EdgeRecord::new(1, 2, 1),
            EdgeRecord::new(2, 3, 1),
            EdgeRecord::new(3, 4, 1),
            EdgeRecord::new(4, 1, 1),
        ];
        let stats = GraphStats::from_edges(&cycle, 4.0);
        assert_eq!(stats.nodes, 4);
        assert_eq!(stats.edges, 4);
        assert!((stats.average_degree - 2.0).abs() < f64::EPSILON);
        assert!((stats.density - 4.0 / 6.0).abs() < 1e-12);
        assert!(!stats.recommend_landmarks);
        assert_eq!(stats.recommended_engine, SearchEngine::Unidirectional);

        let stats = GraphStats::from_edges(&cycle, 2.0);
        assert_eq!(stats.recommended_engine, SearchEngine::Bidirectional);
    }

    #[test]
    fn stats_for_empty_input() {
        let stats = GraphStats::from_edges(&[], 4.0);
        assert_eq!(stats.nodes, 0);
        assert_eq!(stats.density, 0.0);
        assert!(stats.recommend_landmarks);
    }
}
