mod common;

use std::fs;

use altpath_lib::landmarks::{cache, dijkstra, UNREACHABLE};
use altpath_lib::{build, EdgeRecord, EngineConfig, Graph, Heuristic};
use tempfile::TempDir;

use common::random_connected;

fn ten_node_ring() -> Vec<EdgeRecord> {
    (0..10)
        .map(|i| EdgeRecord::new(i, (i + 1) % 10, 1 + i % 3))
        .collect()
}

fn caching_config(dir: &TempDir, count: u32) -> EngineConfig {
    EngineConfig {
        landmark_count: count,
        persist_landmarks: true,
        landmark_cache_path: Some(dir.path().join("landmarks.bin")),
        ..EngineConfig::default()
    }
}

#[test]
fn requesting_more_landmarks_than_nodes_degrades() {
    let mut config = EngineConfig {
        landmark_count: 1000,
        ..EngineConfig::default()
    };
    let (graph, table) = build(&ten_node_ring(), &mut config).expect("build");
    let table = table.expect("landmarks enabled");

    assert_eq!(graph.node_count(), 10);
    assert_eq!(table.landmark_count(), 10);
    assert_eq!(config.landmark_count, 10);
    for index in 0..10 {
        assert_eq!(table.row(index).len(), 10);
    }
}

#[test]
fn landmark_heuristic_is_admissible_on_random_graphs() {
    let edges = random_connected(17, 120, 180);
    let mut config = EngineConfig {
        landmark_count: 6,
        ..EngineConfig::default()
    };
    let (graph, table) = build(&edges, &mut config).expect("build");
    let table = table.expect("landmarks enabled");
    let heuristic = Heuristic::select(&graph, Some(&table));

    for source in (0..graph.node_count() as u32).step_by(7) {
        let exact = dijkstra(&graph, source);
        for (target, &distance) in exact.iter().enumerate() {
            let estimate = heuristic.estimate(source, target as u32);
            assert!(estimate >= 0);
            assert!(distance == UNREACHABLE || estimate <= distance);
        }
    }
}

#[test]
fn persisted_cache_is_reused() {
    let dir = TempDir::new().expect("tempdir");
    let edges = random_connected(8, 60, 60);

    let mut config = caching_config(&dir, 5);
    let (_, first) = build(&edges, &mut config).expect("first build");
    let cache_path = config.landmark_cache_path.clone().expect("path");
    assert!(cache_path.exists());
    assert!(cache::checksum_path(&cache_path).exists());

    let mut config = caching_config(&dir, 5);
    let (_, second) = build(&edges, &mut config).expect("second build");
    let (first, second) = (first.expect("table"), second.expect("table"));

    assert_eq!(first.rows(), second.rows());
    // Tables read back from disk do not know which nodes were chosen.
    assert_eq!(first.landmarks().len(), 5);
    assert!(second.landmarks().is_empty());
}

#[test]
fn corrupt_cache_falls_back_to_preprocessing() {
    let dir = TempDir::new().expect("tempdir");
    let edges = random_connected(21, 50, 40);
    let mut config = caching_config(&dir, 4);
    let (_, original) = build(&edges, &mut config).expect("build");
    let cache_path = config.landmark_cache_path.clone().expect("path");

    let bytes = fs::read(&cache_path).expect("read cache");
    fs::write(&cache_path, &bytes[..bytes.len() / 2]).expect("truncate cache");

    let mut config = caching_config(&dir, 4);
    let (_, rebuilt) = build(&edges, &mut config).expect("rebuild");
    let rebuilt = rebuilt.expect("table");
    assert_eq!(rebuilt.rows(), original.expect("table").rows());
    // Recomputed rather than loaded.
    assert_eq!(rebuilt.landmarks().len(), 4);

    // The rewritten cache is whole again.
    assert_eq!(fs::read(&cache_path).expect("read cache").len(), bytes.len());
}

#[test]
fn cache_for_another_graph_is_ignored() {
    let dir = TempDir::new().expect("tempdir");
    let mut config = caching_config(&dir, 3);
    build(&random_connected(1, 30, 30), &mut config).expect("build");

    let other = random_connected(2, 30, 30);
    let mut config = caching_config(&dir, 3);
    let (graph, table) = build(&other, &mut config).expect("build other");
    let table = table.expect("table");
    assert!(table.matches(&graph));
    assert_eq!(table.landmarks().len(), 3);
}

#[test]
fn cache_with_different_landmark_count_is_recomputed() {
    let dir = TempDir::new().expect("tempdir");
    let edges = random_connected(4, 40, 40);
    build(&edges, &mut caching_config(&dir, 2)).expect("build");

    let mut config = caching_config(&dir, 6);
    let (_, table) = build(&edges, &mut config).expect("rebuild");
    assert_eq!(table.expect("table").landmark_count(), 6);
}

#[test]
fn empty_graph_builds_without_landmark_columns() {
    let mut config = EngineConfig::default();
    let requested = config.landmark_count;
    let (graph, table) = build(&[], &mut config).expect("build");
    assert!(graph.is_empty());
    assert_eq!(table.expect("table").landmark_count(), 0);
    assert_eq!(config.landmark_count, requested);
}

#[test]
fn cache_file_of_wrong_width_is_rejected_by_loader() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("landmarks.bin");
    let graph = Graph::from_edges(&ten_node_ring());
    let table = altpath_lib::LandmarkTable::compute(&graph, 3);
    cache::save(&table, &graph, &path).expect("save");

    let smaller = Graph::from_edges(&ten_node_ring()[..5]);
    assert!(cache::load(&path, &smaller).is_err());
}
