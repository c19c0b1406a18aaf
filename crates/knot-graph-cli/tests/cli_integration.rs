//! Integration tests for the knot CLI.
//!
//! Run with: `cargo test --package knot-graph-cli --test cli_integration`

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

/// Run knot inside `dir` with a config file that keeps loops fast.
fn run_knot(dir: &Path, args: &[&str]) -> Output {
    let config = dir.join("config.json");
    if !config.exists() {
        fs::write(
            &config,
            r#"{"layout": {"simulation_interval_ms": 1, "presentation_interval_ms": 1, "batch_width": 4}}"#,
        )
        .unwrap();
    }

    Command::new(env!("CARGO_BIN_EXE_knot"))
        .current_dir(dir)
        .env_remove("KNOT_CONFIG")
        .arg("--config")
        .arg(&config)
        .args(args)
        .output()
        .expect("Failed to execute knot command")
}

/// Three movies: A and B share a director, B and C share an actor.
fn write_movies(dir: &Path) -> PathBuf {
    let path = dir.join("movies.json");
    fs::write(
        &path,
        r#"[
  {"id": "a", "title": "Alpha", "directors": ["d1"], "genres": ["drama"], "release_year": 2001},
  {"id": "b", "title": "Beta", "directors": ["d1"], "actors": ["p1"], "genres": ["drama"],
   "release_year": 2003, "critics_rating": 90, "audience_rating": 80},
  {"id": "c", "title": "Gamma", "actors": ["p1"], "genres": ["comedy"], "release_year": 1980}
]"#,
    )
    .unwrap();
    path
}

fn write_index(dir: &Path) -> PathBuf {
    let path = dir.join("index.json");
    fs::write(
        &path,
        r#"{"dimension": 2, "entries": [
  {"movie_id": "a", "embedding": [1.0, 0.0]},
  {"movie_id": "b", "embedding": [0.9, 0.1]},
  {"movie_id": "c", "embedding": [0.0, 1.0]}
]}"#,
    )
    .unwrap();
    path
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "knot failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

// =============================================================================
// Basic CLI
// =============================================================================

#[test]
fn test_help() {
    let tmp = TempDir::new().unwrap();
    let output = run_knot(tmp.path(), &["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["edges", "layout", "recommend", "search"] {
        assert!(stdout.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_missing_movies_file() {
    let tmp = TempDir::new().unwrap();
    let output = run_knot(tmp.path(), &["edges", "nope.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.json"));
}

#[test]
fn test_invalid_config_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.json"), r#"{"layout": {"damping": 3.0}}"#).unwrap();
    let movies = write_movies(tmp.path());
    let output = run_knot(tmp.path(), &["edges", movies.to_str().unwrap()]);
    assert!(!output.status.success());
}

// =============================================================================
// Commands
// =============================================================================

#[test]
fn test_edges() {
    let tmp = TempDir::new().unwrap();
    let movies = write_movies(tmp.path());
    let json = stdout_json(&run_knot(tmp.path(), &["edges", movies.to_str().unwrap()]));

    assert_eq!(json["nodes"], 3);
    let edges = json["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0]["a"], "a");
    assert_eq!(edges[0]["b"], "b");
    assert_eq!(edges[0]["directors"], true);
    assert_eq!(edges[1]["a"], "b");
    assert_eq!(edges[1]["b"], "c");
    assert_eq!(edges[1]["actors"], true);

    assert_eq!(json["connections"]["a"], 1);
    assert_eq!(json["connections"]["b"], 2);
    assert_eq!(json["connections"]["c"], 1);
}

#[test]
fn test_layout_writes_positions_within_bounds() {
    let tmp = TempDir::new().unwrap();
    let movies = write_movies(tmp.path());
    let out = tmp.path().join("positions.json");

    let output = run_knot(
        tmp.path(),
        &[
            "layout",
            movies.to_str().unwrap(),
            "--duration-ms",
            "100",
            "--width",
            "800",
            "--height",
            "600",
            "--output",
            out.to_str().unwrap(),
        ],
    );
    assert!(
        output.status.success(),
        "layout failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let positions = json.as_object().unwrap();
    assert_eq!(positions.len(), 3);
    for (id, point) in positions {
        let x = point["x"].as_f64().unwrap();
        let y = point["y"].as_f64().unwrap();
        assert!((0.0..=800.0).contains(&x), "{id}: x = {x}");
        assert!((0.0..=600.0).contains(&y), "{id}: y = {y}");
    }
}

#[test]
fn test_layout_circular() {
    let tmp = TempDir::new().unwrap();
    let movies = write_movies(tmp.path());
    let json = stdout_json(&run_knot(
        tmp.path(),
        &["layout", movies.to_str().unwrap(), "--duration-ms", "20", "--circular"],
    ));

    // a sits at angle 0; b and c mirror each other across the x axis.
    let at = |id: &str| (json[id]["x"].as_f64().unwrap(), json[id]["y"].as_f64().unwrap());
    let (ax, _) = at("a");
    let (bx, by) = at("b");
    let (cx, cy) = at("c");
    assert!(ax > bx);
    assert!((bx - cx).abs() < 1e-9);
    assert!(by > cy);
}

#[test]
fn test_recommend() {
    let tmp = TempDir::new().unwrap();
    let movies = write_movies(tmp.path());
    let index = write_index(tmp.path());

    let json = stdout_json(&run_knot(
        tmp.path(),
        &[
            "recommend",
            movies.to_str().unwrap(),
            "--index",
            index.to_str().unwrap(),
            "--prompt",
            "a",
            "--limit",
            "1",
        ],
    ));

    let ranked = json.as_array().unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0]["id"], "b");
    assert_eq!(ranked[0]["title"], "Beta");
}

#[test]
fn test_recommend_unknown_prompt() {
    let tmp = TempDir::new().unwrap();
    let movies = write_movies(tmp.path());
    let index = write_index(tmp.path());

    let output = run_knot(
        tmp.path(),
        &[
            "recommend",
            movies.to_str().unwrap(),
            "--index",
            index.to_str().unwrap(),
            "--prompt",
            "zzz",
        ],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("zzz"));
}

#[test]
fn test_recommend_layout_includes_watched() {
    let tmp = TempDir::new().unwrap();
    let movies = write_movies(tmp.path());
    let index = write_index(tmp.path());
    let out = tmp.path().join("recommended.json");

    let json = stdout_json(&run_knot(
        tmp.path(),
        &[
            "recommend",
            movies.to_str().unwrap(),
            "--index",
            index.to_str().unwrap(),
            "--prompt",
            "a",
            "--limit",
            "1",
            "--watched",
            "c",
            "--layout",
            out.to_str().unwrap(),
            "--duration-ms",
            "50",
        ],
    ));
    assert_eq!(json[0]["id"], "b");

    let positions: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let positions = positions.as_object().unwrap();
    let mut ids: Vec<&str> = positions.keys().map(String::as_str).collect();
    ids.sort_unstable();
    assert_eq!(ids, ["a", "b", "c"]);
    for point in positions.values() {
        assert!(point["x"].as_f64().unwrap().is_finite());
        assert!(point["y"].as_f64().unwrap().is_finite());
    }
}

#[test]
fn test_recommend_layout_unknown_watched() {
    let tmp = TempDir::new().unwrap();
    let movies = write_movies(tmp.path());
    let index = write_index(tmp.path());
    let out = tmp.path().join("recommended.json");

    let output = run_knot(
        tmp.path(),
        &[
            "recommend",
            movies.to_str().unwrap(),
            "--index",
            index.to_str().unwrap(),
            "--prompt",
            "a",
            "--watched",
            "zzz",
            "--layout",
            out.to_str().unwrap(),
        ],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("zzz"));
    assert!(!out.exists());
}

#[test]
fn test_search_by_title() {
    let tmp = TempDir::new().unwrap();
    let movies = write_movies(tmp.path());

    let json = stdout_json(&run_knot(
        tmp.path(),
        &["search", movies.to_str().unwrap(), "Alpah"],
    ));
    let matches = json.as_array().unwrap();
    assert!(!matches.is_empty());
    assert_eq!(matches[0]["id"], "a");
    assert_eq!(matches[0]["title"], "Alpha");

    let json = stdout_json(&run_knot(
        tmp.path(),
        &["search", movies.to_str().unwrap(), "GAMMA", "--limit", "1"],
    ));
    let matches = json.as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["id"], "c");
    assert!((matches[0]["score"].as_f64().unwrap() - 1.0).abs() < 1e-5);
}

#[test]
fn test_search_blank_text() {
    let tmp = TempDir::new().unwrap();
    let movies = write_movies(tmp.path());
    let json = stdout_json(&run_knot(
        tmp.path(),
        &["search", movies.to_str().unwrap(), "  "],
    ));
    assert_eq!(json, Value::Array(Vec::new()));
}
