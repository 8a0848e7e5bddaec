mod common;

use std::fs;

use altpath_lib::{
    check_connectivity, check_integrity, read_edges, EngineConfig, Error, GraphStats, PathFinder,
    SearchEngine,
};
use tempfile::TempDir;

use common::{assert_valid_path, fixtures_dir, oracle_cost};

#[test]
fn fixture_grid_loads_and_validates() {
    let edges = read_edges(&fixtures_dir().join("grid_8x6.csv")).expect("fixture loads");
    assert_eq!(edges.len(), 89);
    check_integrity(&edges).expect("no duplicate edges");
    check_connectivity(&edges).expect("grid is connected");

    let stats = GraphStats::from_edges(&edges, 4.0);
    assert_eq!(stats.nodes, 48);
    assert_eq!(stats.edges, 89);
    assert!(stats.average_degree < 4.0);
    assert_eq!(stats.recommended_engine, SearchEngine::Unidirectional);
    assert!(!stats.recommend_landmarks);
}

#[test]
fn fixture_grid_routes_corner_to_corner() {
    let edges = read_edges(&fixtures_dir().join("grid_8x6.csv")).expect("fixture loads");
    let finder = PathFinder::from_edges(&edges, EngineConfig::default()).expect("build");
    let expected = oracle_cost(finder.graph(), 100, 147);

    for engine in [SearchEngine::Unidirectional, SearchEngine::Bidirectional] {
        let result = finder.query(100, 147, 1.0, engine);
        assert_eq!(result.total_cost, expected);
        assert_valid_path(finder.graph(), &result, 100, 147);
    }
}

#[test]
fn upper_case_extension_is_accepted() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("EDGES.CSV");
    fs::write(&path, "1,2,3\n2,3,4\n").expect("write");
    assert_eq!(read_edges(&path).expect("load").len(), 2);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let err = read_edges(&dir.path().join("absent.csv")).expect_err("missing");
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn file_of_only_bad_rows_is_empty() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("bad.csv");
    fs::write(&path, "a,b,c\n1,2\n3,4,0\n").expect("write");
    let err = read_edges(&path).expect_err("nothing usable");
    assert!(err.to_string().contains("bad.csv"));
}

#[test]
fn duplicates_and_splits_are_reported_from_files() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("dup.csv");
    fs::write(&path, "1,2,3\n2,3,4\n3,2,9\n7,8,1\n").expect("write");
    let edges = read_edges(&path).expect("load");

    assert!(matches!(
        check_integrity(&edges),
        Err(Error::DuplicateEdge { a: 2, b: 3, .. })
    ));
    assert!(matches!(
        check_connectivity(&edges),
        Err(Error::Disconnected { components: 2 })
    ));
}
