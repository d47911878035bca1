//! End-to-end tests of the `intersector` binary.
//!
//! Each test runs the compiled binary inside its own temporary directory
//! with a generated STL cube and an explicit configuration file, so a
//! user's default configuration is never picked up.

use std::path::Path;
use std::process::{Command, Output};

use intersector::backend::mesh::{cuboid_triangles, stl};
use nalgebra::Point3;
use tempfile::TempDir;

const CUBE_FILE: &str = "cube.stl";
const CONFIG_FILE: &str = "config.json";

/// Creates a working directory holding a 10 mm cube and `config`.
fn workspace(config: &str) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let cube = cuboid_triangles(Point3::origin(), Point3::new(10.0, 10.0, 10.0));
    stl::write_stl(&dir.path().join(CUBE_FILE), &cube).expect("Failed to write cube");
    std::fs::write(dir.path().join(CONFIG_FILE), config).expect("Failed to write config");
    dir
}

fn run(dir: &Path, input: &str, plane: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_intersector"))
        .current_dir(dir)
        .args(["--config", CONFIG_FILE, "intersect", "--in-step", input])
        .args(["--in-plane", plane])
        .output()
        .expect("Failed to run intersector")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn cutting_plane_writes_intersection_file() {
    let dir = workspace("{}");
    let output = run(dir.path(), CUBE_FILE, "0,0,5:0,0,1");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Result saved to 'intersection.stp'"));

    let content = std::fs::read_to_string(dir.path().join("intersection.stp"))
        .expect("intersection.stp was not written");
    assert!(content.starts_with("ISO-10303-21;"));
    assert_eq!(content.matches("POLYLINE(").count(), 1);
}

#[test]
fn missing_plane_exits_successfully_without_output() {
    let dir = workspace("{}");
    let output = run(dir.path(), CUBE_FILE, "0,0,100:0,0,1");

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("No intersection"));
    assert!(!dir.path().join("intersection.stp").exists());
}

#[test]
fn missing_input_file_fails() {
    let dir = workspace("{}");
    let output = run(dir.path(), "nope.stl", "0,0,5:0,0,1");

    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Failed to read STEP file: 'nope.stl'"));
}

#[test]
fn step_input_is_not_readable_by_mesh_backend() {
    let dir = workspace("{}");
    std::fs::write(dir.path().join("part.step"), "ISO-10303-21;").unwrap();
    let output = run(dir.path(), "part.step", "0,0,5:0,0,1");

    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Failed to read STEP file"));
}

#[test]
fn missing_argument_is_a_usage_error() {
    let dir = workspace("{}");
    let output = Command::new(env!("CARGO_BIN_EXE_intersector"))
        .current_dir(dir.path())
        .args(["--config", CONFIG_FILE, "intersect", "--in-step", CUBE_FILE])
        .output()
        .expect("Failed to run intersector");

    assert_eq!(output.status.code(), Some(2));
    assert!(!dir.path().join("intersection.stp").exists());
}

#[test]
fn malformed_plane_fails() {
    let dir = workspace("{}");
    let output = run(dir.path(), CUBE_FILE, "0,0,5;0,0,1");

    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("Invalid plane definition: '0,0,5;0,0,1'"));
}

#[test]
fn zero_normal_fails_computation() {
    let dir = workspace("{}");
    let output = run(dir.path(), CUBE_FILE, "0,0,5:0,0,0");

    assert_eq!(output.status.code(), Some(6));
    assert!(stderr(&output).contains("Intersection computation failed"));
    assert!(!dir.path().join("intersection.stp").exists());
}

#[test]
fn spaced_plane_components_are_accepted() {
    let dir = workspace("{}");
    let output = run(dir.path(), CUBE_FILE, "0, 0, 5:0, 0, 1");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("intersection.stp").exists());
}

#[test]
fn bad_config_fails_before_running() {
    let dir = workspace(r#"{ "logging": { "level": "chatty" } }"#);
    let output = run(dir.path(), CUBE_FILE, "0,0,5:0,0,1");

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Configuration error"));
    assert!(!dir.path().join("intersection.stp").exists());
}

#[cfg(unix)]
#[test]
fn successful_viewer_exit_succeeds() {
    let dir = workspace(r#"{ "viewer": { "command": "true" } }"#);
    let output = run(dir.path(), CUBE_FILE, "0,0,5:0,0,1");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

#[cfg(unix)]
#[test]
fn viewer_failure_exits_non_zero_after_export() {
    let dir = workspace(r#"{ "viewer": { "command": "false" } }"#);
    let output = run(dir.path(), CUBE_FILE, "0,0,5:0,0,1");

    assert_eq!(output.status.code(), Some(8));
    assert!(stderr(&output).contains("Error displaying shapes"));
    assert!(dir.path().join("intersection.stp").exists());
}
