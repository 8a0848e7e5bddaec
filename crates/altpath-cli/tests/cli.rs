use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{tempdir, TempDir};

use altpath_lib::EngineConfig;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures/grid_8x6.csv")
        .canonicalize()
        .expect("fixture edge list present")
}

fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("altpath");
    cmd.env("RUST_LOG", "error");
    cmd
}

fn write_edges(dir: &TempDir, name: &str, rows: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, rows).expect("write edge list");
    path
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

#[test]
fn check_reports_fixture_statistics() {
    cli()
        .args(["check", "--map", arg(&fixture_path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nodes: 48"))
        .stdout(predicate::str::contains("Edges: 89"))
        .stdout(predicate::str::contains("Connectivity check: passed"))
        .stdout(predicate::str::contains("Estimated memory:"));
}

#[test]
fn check_json_output_is_parseable() {
    let output = cli()
        .args(["check", "--map", arg(&fixture_path()), "--format", "json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["nodes"], 48);
    assert_eq!(value["integrity"], true);
    assert_eq!(value["recommended_engine"], "unidirectional");
    // 89 undirected edges are stored once per direction.
    assert!(value["memory"]["edges"].as_u64().expect("edge bytes") >= 2 * 89 * 8);
    assert_eq!(
        value["landmark_bytes"],
        altpath_lib::LandmarkTable::estimated_footprint(48, 16)
    );
}

#[test]
fn check_fails_on_disconnected_graph() {
    let dir = tempdir().expect("tempdir");
    let map = write_edges(&dir, "split.csv", "1,2,1\n3,4,1\n");
    cli()
        .args(["check", "--map", arg(&map)])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Connectivity check: FAILED"))
        .stderr(predicate::str::contains("not connected"));
}

#[test]
fn check_rejects_non_csv_file() {
    let dir = tempdir().expect("tempdir");
    let map = write_edges(&dir, "edges.txt", "1,2,1\n");
    cli()
        .args(["check", "--map", arg(&map)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a .csv file"));
}

#[test]
fn route_prints_path_in_text() {
    let dir = tempdir().expect("tempdir");
    let map = write_edges(&dir, "line.csv", "1,2,5\n2,3,7\n");
    for engine in ["uni", "bi"] {
        cli()
            .args(["route", "--map", arg(&map), "--from", "1", "--to", "3"])
            .args(["--engine", engine])
            .assert()
            .success()
            .stdout(predicate::str::contains("1 -> 2 -> 3"))
            .stdout(predicate::str::contains("Total cost: 12"));
    }
}

#[test]
fn route_json_on_fixture() {
    let output = cli()
        .args(["route", "--map", arg(&fixture_path())])
        .args(["--from", "100", "--to", "147", "--format", "json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["start"], 100);
    assert_eq!(value["end"], 147);
    assert_eq!(value["path"][0], 100);
    assert!(value["total_cost"].as_i64().expect("cost") > 0);
}

#[test]
fn route_without_path_fails() {
    let dir = tempdir().expect("tempdir");
    let map = write_edges(&dir, "split.csv", "1,2,1\n3,4,1\n");
    cli()
        .args(["route", "--map", arg(&map), "--from", "1", "--to", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no path found from 1 to 4"));
}

#[test]
fn route_rejects_weight_above_maximum() {
    let dir = tempdir().expect("tempdir");
    let map = write_edges(&dir, "line.csv", "1,2,5\n2,3,7\n");
    cli()
        .args(["route", "--map", arg(&map), "--from", "1", "--to", "3"])
        .args(["--weight", "3.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --weight"))
        .stderr(predicate::str::contains("weight must be between 1.0 and 2"));
}

#[test]
fn route_accepts_weight_within_bounds_without_override_policy() {
    let dir = tempdir().expect("tempdir");
    let map = write_edges(&dir, "line.csv", "1,2,5\n2,3,7\n");
    cli()
        .args(["route", "--map", arg(&map), "--from", "1", "--to", "3"])
        .args(["--weight", "1.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("weight: 1.5"))
        .stdout(predicate::str::contains("Total cost: 12"));
}

#[test]
fn route_rejects_unknown_engine() {
    cli()
        .args(["route", "--map", arg(&fixture_path()), "--from", "100", "--to", "101"])
        .args(["--engine", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown search engine"));
}

#[test]
fn init_config_writes_defaults_and_refuses_overwrite() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("conf").join("altpath.toml");

    cli()
        .args(["init-config", arg(&path)])
        .assert()
        .success();
    let config = EngineConfig::load(&path).expect("written config loads");
    assert_eq!(config.landmark_count, EngineConfig::default().landmark_count);

    cli()
        .args(["init-config", arg(&path)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    cli()
        .args(["init-config", arg(&path), "--force"])
        .assert()
        .success();
}

#[test]
fn preprocess_writes_cache_and_lowers_landmark_count() {
    let dir = tempdir().expect("tempdir");
    let map = write_edges(&dir, "small.csv", "1,2,1\n2,3,1\n3,4,1\n");
    let cache = dir.path().join("cache").join("landmarks.bin");
    let config_path = dir.path().join("altpath.toml");
    EngineConfig {
        landmark_count: 50,
        ..EngineConfig::default()
    }
    .save(&config_path)
    .expect("save config");

    cli()
        .args(["--config", arg(&config_path), "preprocess"])
        .args(["--map", arg(&map), "--cache", arg(&cache)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Computed 4 landmarks for 4 nodes"))
        .stdout(predicate::str::contains("Updated landmark_count to 4"));

    assert!(cache.exists());
    assert!(dir.path().join("cache").join("landmarks.bin.sha256").exists());
    let updated = EngineConfig::load(&config_path).expect("reload");
    assert_eq!(updated.landmark_count, 4);
}

#[test]
fn preprocess_requires_a_cache_path() {
    cli()
        .args(["preprocess", "--map", arg(&fixture_path())])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--cache"));
}

#[test]
fn route_uses_map_path_from_config() {
    let dir = tempdir().expect("tempdir");
    let map = write_edges(&dir, "line.csv", "1,2,5\n2,3,7\n");
    let config_path = dir.path().join("altpath.toml");
    EngineConfig {
        map_path: Some(map),
        search_engine: altpath_lib::SearchEngine::Unidirectional,
        ..EngineConfig::default()
    }
    .save(&config_path)
    .expect("save config");

    cli()
        .args(["--config", arg(&config_path), "route", "--from", "3", "--to", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 -> 2 -> 1"))
        .stdout(predicate::str::contains("engine: unidirectional"));
}
