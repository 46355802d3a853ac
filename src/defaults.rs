//! Default values for build-farm configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::time::Duration;

/// Default project configuration file name.
pub const DEFAULT_CONFIG_FILENAME: &str = "config.yaml";

/// Default directory where projects are cloned and built.
pub const DEFAULT_BUILD_DIR: &str = "build/";

/// Default directory for per-project build logs.
pub const DEFAULT_LOGS_DIR: &str = "logs/";

/// Name of the completed-targets log inside the build directory.
pub const DONE_LOG_FILENAME: &str = "done.log";

/// Default CI workflow file patched by the `workflow` command.
pub const DEFAULT_WORKFLOW_TARGET: &str = ".github/workflows/main.yml";

/// Clean script used when a project does not declare one.
pub const DEFAULT_CLEAN_SCRIPT: &str = "git reset --hard && git clean -fdx .";

/// Clone depth used when a project does not declare one.
pub const DEFAULT_CLONE_DEPTH: i64 = 1;

/// File suffix identifying compiled bitcode artifacts.
pub const ARTIFACT_SUFFIX: &str = ".bc";

/// Optimization level used when none is requested.
pub const DEFAULT_OPT_LEVEL: &str = "0";

/// Upper bound on a single optimizer invocation.
pub const OPTIMIZE_TIMEOUT: Duration = Duration::from_secs(60);

/// Returns the optimization levels to use, falling back to the baseline.
pub fn opt_levels_or_default(levels: &[String]) -> Vec<String> {
    if levels.is_empty() {
        vec![DEFAULT_OPT_LEVEL.to_string()]
    } else {
        levels.to_vec()
    }
}
