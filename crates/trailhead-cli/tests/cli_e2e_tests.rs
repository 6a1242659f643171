//! End-to-end tests for the `trailhead` binary
//!
//! Each test builds a throwaway project whose compiler is a small shell
//! script, so the full verify -> deploy -> compile pipeline runs for real.
#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

const FAKE_COMPILER: &str = r#"#!/bin/sh
out=""
src=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) shift; out="$1" ;;
    *.cpp) src="$1" ;;
  esac
  shift
done
case "$src" in
  *broken*) echo "$src:7:3: error: 'glClear' was not declared" >&2; exit 1 ;;
esac
printf 'binary built from %s\n' "$src" > "$out"
"#;

/// Project with a fake compiler, a complete dependency tree and two targets
fn create_test_project(sources: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    fs::write(root.join("cxx.sh"), FAKE_COMPILER).unwrap();
    fs::set_permissions(root.join("cxx.sh"), fs::Permissions::from_mode(0o755)).unwrap();

    for dir in ["deps/sdl/include", "deps/sdl/lib", "deps/sdl/bin", "deps/glm"] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    fs::write(root.join("deps/sdl/bin/libSDL2.so"), b"runtime").unwrap();

    let mut config = format!(
        r#"
[project]
name = "CLI Test"

[toolchain]
compiler = "{}"
link_libs = ["SDL2"]
static_runtime = []
timeout_secs = 5

[dependencies]
root = "deps"

[[component]]
name = "SDL2"
dir = "sdl"
include = "include"
lib = "lib"
runtime = "bin/libSDL2.so"

[[component]]
name = "GLM"
dir = "glm"
"#,
        root.join("cxx.sh").display()
    );
    for (source, output) in sources {
        fs::write(root.join(source), "int main() {}\n").unwrap();
        config.push_str(&format!(
            "\n[[target]]\nsource = \"{}\"\noutput = \"{}\"\ndescription = \"{} binary\"\n",
            source, output, output
        ));
    }
    fs::write(root.join("trailhead.toml"), config).unwrap();

    temp_dir
}

fn default_project() -> TempDir {
    create_test_project(&[("main.cpp", "hiking"), ("main_shaders.cpp", "shaders")])
}

fn trailhead(project: &TempDir) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("trailhead");
    cmd.arg("--project-dir")
        .arg(project.path())
        .env_remove("TRAILHEAD_CXX")
        .env_remove("TRAILHEAD_TIMEOUT")
        .env_remove("TRAILHEAD_DEPS_DIR")
        .env_remove("TRAILHEAD_DIAGNOSTICS")
        .env("NO_COLOR", "1");
    cmd
}

// ============================================================================
// trailhead build
// ============================================================================

#[test]
fn test_build_success() {
    let project = default_project();

    trailhead(&project)
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("CLI TEST BUILD SYSTEM"))
        .stdout(predicate::str::contains("[OK] Found: SDL2 includes"))
        .stdout(predicate::str::contains("[✓] Copied libSDL2.so"))
        .stdout(predicate::str::contains("[✓] Created: hiking"))
        .stdout(predicate::str::contains("BUILD SUCCESSFUL!"))
        .stdout(predicate::str::contains("(shaders binary)"));

    assert!(project.path().join("hiking").exists());
    assert!(project.path().join("shaders").exists());
    assert!(project.path().join("libSDL2.so").exists());
}

#[test]
fn test_no_subcommand_builds() {
    let project = default_project();

    trailhead(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("BUILD SUCCESSFUL!"));
}

#[test]
fn test_build_verbose_shows_command() {
    let project = create_test_project(&[("main.cpp", "hiking")]);

    trailhead(&project)
        .args(["build", "--verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[DEBUG] Command: "))
        .stdout(predicate::str::contains("-std=c++17"));
}

#[test]
fn test_build_missing_dependency_fails_before_compiling() {
    let project = default_project();
    fs::remove_dir_all(project.path().join("deps/glm")).unwrap();

    trailhead(&project)
        .arg("build")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[!] Missing: GLM includes"))
        .stdout(predicate::str::contains("[ERROR] Missing 1 dependencies!"))
        .stdout(predicate::str::contains("Compiling").not());

    assert!(!project.path().join("hiking").exists());
    assert!(!project.path().join("libSDL2.so").exists());
}

#[test]
fn test_build_compile_error_shows_stderr_and_fails() {
    let project = create_test_project(&[("broken.cpp", "broken"), ("main.cpp", "hiking")]);

    trailhead(&project)
        .arg("build")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[ERROR] Compilation failed!"))
        .stdout(predicate::str::contains("STDERR:"))
        .stdout(predicate::str::contains("'glClear' was not declared"))
        .stdout(predicate::str::contains("[✓] Created: hiking"))
        .stdout(predicate::str::contains("BUILD SUCCESSFUL!").not());
}

#[test]
fn test_build_missing_runtime_binary_fails_verification() {
    let project = default_project();
    fs::remove_file(project.path().join("deps/sdl/bin/libSDL2.so")).unwrap();

    // The runtime binary is a verified dependency, so this is caught up front
    trailhead(&project)
        .arg("build")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[!] Missing: SDL2 runtime"));
}

#[test]
fn test_build_compiler_from_environment() {
    let project = create_test_project(&[("main.cpp", "hiking")]);

    trailhead(&project)
        .arg("build")
        .env("TRAILHEAD_CXX", "trailhead-no-such-compiler")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[ERROR] Compilation error:"));
}

// ============================================================================
// JSON output
// ============================================================================

#[test]
fn test_build_json_report() {
    let project = default_project();

    let output = trailhead(&project)
        .args(["build", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("[*]"));
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["verdict"], "success");
    assert_eq!(report["outcomes"].as_array().unwrap().len(), 2);
    assert_eq!(report["outcomes"][0]["status"]["kind"], "succeeded");
    assert_eq!(report["verification"]["missing"].as_array().unwrap().len(), 0);
}

#[test]
fn test_json_report_from_environment() {
    let project = create_test_project(&[("broken.cpp", "broken")]);

    let output = trailhead(&project)
        .arg("build")
        .env("TRAILHEAD_DIAGNOSTICS", "json")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["verdict"], "partial-failure");
    assert_eq!(report["outcomes"][0]["status"]["kind"], "non_zero_exit");
    assert!(report["outcomes"][0]["stderr"]
        .as_str()
        .unwrap()
        .contains("glClear"));
}

// ============================================================================
// trailhead clean / rebuild / check
// ============================================================================

#[test]
fn test_clean_removes_artifacts_and_repeats_cleanly() {
    let project = default_project();
    trailhead(&project).arg("build").assert().success();

    trailhead(&project)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("[✓] Removed hiking"))
        .stdout(predicate::str::contains("[✓] Removed libSDL2.so"))
        .stdout(predicate::str::contains("Clean complete"));

    assert!(!project.path().join("hiking").exists());
    assert!(!project.path().join("libSDL2.so").exists());
    assert!(project.path().join("main.cpp").exists());

    trailhead(&project)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed").not());
}

#[test]
fn test_rebuild_replaces_stale_artifacts() {
    let project = create_test_project(&[("main.cpp", "hiking")]);
    fs::write(project.path().join("hiking"), "stale").unwrap();

    trailhead(&project)
        .arg("rebuild")
        .assert()
        .success()
        .stdout(predicate::str::contains("[✓] Removed hiking"))
        .stdout(predicate::str::contains("BUILD SUCCESSFUL!"));

    let contents = fs::read_to_string(project.path().join("hiking")).unwrap();
    assert_eq!(contents, "binary built from main.cpp\n");
}

#[test]
fn test_check_success_and_failure() {
    let project = default_project();

    trailhead(&project)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("All 4 dependencies found"));
    assert!(!project.path().join("hiking").exists());

    fs::remove_dir_all(project.path().join("deps/sdl/lib")).unwrap();
    trailhead(&project)
        .arg("check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[!] Missing: SDL2 libs"));
}

// ============================================================================
// Configuration errors
// ============================================================================

#[test]
fn test_invalid_config_is_reported() {
    let project = default_project();
    fs::write(project.path().join("trailhead.toml"), "[toolchain]\nspeed = 11\n").unwrap();

    trailhead(&project)
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load project configuration"));
}

#[test]
fn test_explicit_config_file() {
    let project = default_project();
    let alternate = project.path().join("alt.toml");
    let config = fs::read_to_string(project.path().join("trailhead.toml"))
        .unwrap()
        .replace("\"CLI Test\"", "\"Alt Config\"");
    fs::write(&alternate, config).unwrap();

    trailhead(&project)
        .args(["check", "--config"])
        .arg(&alternate)
        .assert()
        .success()
        .stdout(predicate::str::contains("All 4 dependencies found"));

    trailhead(&project)
        .args(["build", "--config"])
        .arg(&alternate)
        .assert()
        .success()
        .stdout(predicate::str::contains("ALT CONFIG BUILD SYSTEM"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let project = default_project();

    trailhead(&project)
        .args(["build", "--config", "does-not-exist.toml"])
        .assert()
        .failure();
}
