//! Shared fixtures: a throwaway project with a fake compiler
//!
//! The fake compiler is a shell script that understands just enough of the
//! gcc command line to find the source and `-o` output. Its behaviour is
//! picked by the source file name:
//! - `*slow*`: records its pid and sleeps far past any test timeout
//! - `*broken*`: prints diagnostics to both streams and exits 1
//! - `*liar*`: exits 0 without writing the output
//! - `*daemon*`: writes the output but leaves a background process (pid in
//!   `daemon.pid`) holding stdout and stderr open
//! - anything else: writes a non-empty output file

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

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
echo "$src" >> compile.log
case "$src" in
  *slow*) echo $$ > slow.pid; exec sleep 30 ;;
  *broken*) echo "compiling $src"; echo "$src:1:1: error: expected ';'" >&2; exit 1 ;;
  *liar*) exit 0 ;;
  *daemon*) sleep 30 & echo $! > daemon.pid ;;
esac
printf 'binary built from %s\n' "$src" > "$out"
"#;

pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    /// Project with a complete dependency tree and the given targets
    pub fn new(targets: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        let compiler = root.join("tools/fake-cxx");
        fs::create_dir_all(compiler.parent().unwrap()).unwrap();
        fs::write(&compiler, FAKE_COMPILER).unwrap();
        fs::set_permissions(&compiler, fs::Permissions::from_mode(0o755)).unwrap();

        fs::create_dir_all(root.join("deps/SDL2/include")).unwrap();
        fs::create_dir_all(root.join("deps/SDL2/lib")).unwrap();
        fs::create_dir_all(root.join("deps/SDL2/bin")).unwrap();
        fs::write(root.join("deps/SDL2/bin/libSDL2.so"), b"sdl2 runtime").unwrap();
        fs::create_dir_all(root.join("deps/GLEW/include")).unwrap();
        fs::create_dir_all(root.join("deps/GLEW/lib")).unwrap();
        fs::create_dir_all(root.join("deps/GLEW/bin")).unwrap();
        fs::write(root.join("deps/GLEW/bin/libGLEW.so"), b"glew runtime").unwrap();
        fs::create_dir_all(root.join("deps/glm")).unwrap();

        let mut config = format!(
            r#"
[project]
name = "Trail Test"

[toolchain]
compiler = "{}"
warnings = ["-Wall"]
link_libs = ["SDL2", "GLEW"]
static_runtime = []
timeout_secs = 2

[dependencies]
root = "deps"

[[component]]
name = "SDL2"
dir = "SDL2"
include = "include"
lib = "lib"
runtime = "bin/libSDL2.so"

[[component]]
name = "GLEW"
dir = "GLEW"
include = "include"
lib = "lib"
runtime = "bin/libGLEW.so"

[[component]]
name = "GLM"
dir = "glm"
"#,
            compiler.display()
        );
        for (source, output) in targets {
            fs::write(root.join(source), "int main() { return 0; }\n").unwrap();
            config.push_str(&format!(
                "\n[[target]]\nsource = \"{}\"\noutput = \"{}\"\n",
                source, output
            ));
        }
        fs::write(root.join("trailhead.toml"), config).unwrap();

        Self { dir }
    }

    /// The standard two-target project that builds cleanly
    pub fn two_targets() -> Self {
        Self::new(&[("main.cpp", "hiking"), ("main_shaders.cpp", "shaders")])
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn remove(&self, relative: &str) {
        let path = self.join(relative);
        if path.is_dir() {
            fs::remove_dir_all(path).unwrap();
        } else {
            fs::remove_file(path).unwrap();
        }
    }

    /// Sources the fake compiler was invoked for, in order
    pub fn compile_log(&self) -> Vec<String> {
        fs::read_to_string(self.join("compile.log"))
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
