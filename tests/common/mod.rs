//! Shared test utilities for E2E tests.
//!
//! This module provides fixtures for a build directory populated with
//! bitcode files, config snippets, and stand-in scripts for the LLVM tools
//! the pipeline calls, so the binary can be exercised without an LLVM
//! installation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_file("build/zlib/a.bc", "bitcode")
//!         .with_fake_tools();
//!     fixture.command().arg("postprocess").arg("strip").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{configs, tools};
    pub use super::TestFixture;
}

/// Project lists used across tests.
#[allow(dead_code)]
pub mod configs {
    /// One GitHub project whose build leaves a marker file behind.
    pub const SINGLE: &str = r#"
- url: https://github.com/madler/zlib.git
  build: touch built.txt && echo "log dir is $LOG_DIR"
  clean: "true"
"#;

    /// Two projects, the second of which always fails to build.
    pub const ONE_FAILING: &str = r#"
- url: https://github.com/madler/zlib.git
  build: touch built.txt
  clean: "true"
- url: https://github.com/curl/curl.git
  build: exit 3
  clean: "true"
"#;

    /// Projects with apt requirements in both accepted shapes.
    pub const WITH_REQUIREMENTS: &str = r#"
- url: https://github.com/madler/zlib.git
  build: make
  requirements: [autoconf, libtool]
- url: https://github.com/curl/curl.git
  build: make
  requirements:
    packages: [libssl-dev]
    build-dep: [curl]
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "- url: [unclosed";
}

/// Stand-in scripts for the external tools.
#[allow(dead_code)]
pub mod tools {
    /// `opt` that copies its input to the `-o` target.
    pub const OPT: &str = r#"#!/bin/sh
in="$1"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; fi
  shift
done
cp "$in" "$out"
"#;

    /// `opt` that rejects every input.
    pub const OPT_FAILING: &str = "#!/bin/sh\nexit 1\n";

    /// `llvm-dis` writing the `.ll` file next to its input.
    pub const LLVM_DIS: &str = "#!/bin/sh\ncp \"$1\" \"${1%.bc}.ll\"\n";

    /// `souper` printing one candidate per input.
    pub const SOUPER: &str = "#!/bin/sh\necho \"; candidate from $1\"\n";
}

/// A temporary directory holding a config, a build directory and a `bin/`
/// directory of tool scripts that is put first on `PATH`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `config.yaml` with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.with_file("config.yaml", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Create an empty directory.
    pub fn with_dir(self, path: &str) -> Self {
        self.temp_dir
            .child(path)
            .create_dir_all()
            .expect("Failed to create directory");
        self
    }

    /// Install an executable script as `bin/<name>`.
    pub fn with_tool(self, name: &str, script: &str) -> Self {
        let path = self.bin_dir().join(name);
        fs::create_dir_all(self.bin_dir()).expect("Failed to create bin directory");
        fs::write(&path, script).expect("Failed to write tool script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("Failed to make tool executable");
        self
    }

    /// Install working `opt`, `llvm-dis` and `souper` stand-ins.
    pub fn with_fake_tools(self) -> Self {
        self.with_tool("opt", tools::OPT)
            .with_tool("llvm-dis", tools::LLVM_DIS)
            .with_tool("souper", tools::SOUPER)
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.temp_dir.path().join("bin")
    }

    pub fn build_dir(&self) -> PathBuf {
        self.temp_dir.path().join("build")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// `PATH` with the fixture's `bin/` in front of the inherited one.
    pub fn search_path(&self) -> std::ffi::OsString {
        let mut dirs = vec![self.bin_dir()];
        if let Some(inherited) = env::var_os("PATH") {
            dirs.extend(env::split_paths(&inherited));
        }
        env::join_paths(dirs).expect("PATH entries should be joinable")
    }

    /// Create a command running in this fixture's directory with the fake
    /// tools first on `PATH`.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("build-farm");
        cmd.current_dir(self.path())
            .env("PATH", self.search_path())
            .env_remove("BUILD_FARM_CONFIG")
            .env_remove("BUILD_FARM_BUILD_DIR")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_tool_is_executable() {
        let fixture = TestFixture::new().with_tool("opt", tools::OPT);
        let mode = fs::metadata(fixture.bin_dir().join("opt"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn test_configs_are_valid_yaml() {
        for config in [configs::SINGLE, configs::ONE_FAILING, configs::WITH_REQUIREMENTS] {
            serde_yaml::from_str::<serde_yaml::Value>(config).expect("Config should be valid YAML");
        }
    }

    #[test]
    fn test_invalid_yaml_is_actually_invalid() {
        let result = serde_yaml::from_str::<serde_yaml::Value>(configs::INVALID_YAML);
        assert!(result.is_err(), "INVALID_YAML should not parse");
    }
}
