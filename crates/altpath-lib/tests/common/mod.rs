//! Common test utilities: fixture paths, random graphs, and a Dijkstra oracle.

use std::collections::HashSet;
use std::path::PathBuf;

use altpath_lib::landmarks::dijkstra;
use altpath_lib::{EdgeRecord, Graph, NodeId, PathResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Path to fixtures directory shared by the workspace tests.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Connected random graph with shuffled, non-contiguous node ids.
///
/// A random spanning tree guarantees connectivity; `extra` additional edges
/// are sprinkled on top without creating duplicates.
pub fn random_connected(seed: u64, nodes: usize, extra: usize) -> Vec<EdgeRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ids: Vec<NodeId> = (0..nodes as NodeId).map(|i| i * 3 + 7).collect();
    ids.shuffle(&mut rng);

    let mut seen = HashSet::new();
    let mut edges = Vec::with_capacity(nodes + extra);
    let mut push = |a: NodeId, b: NodeId, cost: u32, edges: &mut Vec<EdgeRecord>| {
        let key = (a.min(b), a.max(b));
        if a != b && seen.insert(key) {
            edges.push(EdgeRecord::new(a, b, cost));
        }
    };

    for i in 1..nodes {
        let parent = ids[rng.gen_range(0..i)];
        let cost = rng.gen_range(1..=20);
        push(ids[i], parent, cost, &mut edges);
    }
    for _ in 0..extra {
        let a = ids[rng.gen_range(0..nodes)];
        let b = ids[rng.gen_range(0..nodes)];
        let cost = rng.gen_range(1..=20);
        push(a, b, cost, &mut edges);
    }
    edges
}

/// Exact shortest-path cost between two external ids, `-1` when unreachable.
pub fn oracle_cost(graph: &Graph, start: NodeId, end: NodeId) -> i32 {
    match (graph.index_of(start), graph.index_of(end)) {
        (Some(from), Some(to)) => dijkstra(graph, from)[to as usize],
        _ => -1,
    }
}

/// Assert that `result` describes a real walk from `start` to `end` whose
/// edge costs add up to `total_cost`.
pub fn assert_valid_path(graph: &Graph, result: &PathResult, start: NodeId, end: NodeId) {
    assert_eq!(result.node_count, result.path.len());
    assert_eq!(result.path.first(), Some(&start), "path must begin at start");
    assert_eq!(result.path.last(), Some(&end), "path must end at goal");

    let mut total = 0i32;
    for pair in result.path.windows(2) {
        let from = graph.index_of(pair[0]).expect("path node in graph");
        let to = graph.index_of(pair[1]).expect("path node in graph");
        let edge = graph
            .neighbours(from)
            .iter()
            .filter(|e| e.target == to)
            .map(|e| e.weight)
            .min()
            .unwrap_or_else(|| panic!("{} and {} are not adjacent", pair[0], pair[1]));
        total += edge;
    }
    assert_eq!(total, result.total_cost, "reported cost must equal path cost");
}

/// A handful of deterministic query pairs drawn from the graph's ids.
pub fn sample_pairs(graph: &Graph, seed: u64, count: usize) -> Vec<(NodeId, NodeId)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = graph.node_count() as u32;
    (0..count)
        .map(|_| {
            let a = graph.id_of(rng.gen_range(0..n));
            let b = graph.id_of(rng.gen_range(0..n));
            (a, b)
        })
        .collect()
}
