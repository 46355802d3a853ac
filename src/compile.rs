//! # Cloning and Building Projects
//!
//! This module drives the first half of the farm: getting each configured
//! project onto disk and running its build script.
//!
//! ## Layout
//!
//! Everything happens under a build directory:
//!
//! ```text
//! build/
//! ├── done.log        # URLs of projects whose last build succeeded
//! ├── zlib/           # one checkout per project, named by `dir`
//! └── curl/
//! ```
//!
//! Build output goes to a separate logs directory, one subdirectory per
//! project holding `log.stdout.log` and `log.stderr.log`. The build script
//! also receives that subdirectory as `LOG_DIR`, so it can drop extra
//! artifacts there.
//!
//! ## Completed-targets log
//!
//! `done.log` lets repeated runs skip finished projects. It is rewritten
//! after each run that had at least one success: previous successes are
//! kept, every project that did not succeed this run is removed, and this
//! run's successes are added.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, error, info};

use crate::config::ProjectConfig;
use crate::error::{Error, Result};
use crate::path::shell_quote;

/// Shell command that clones `project` unless its directory already exists.
pub fn clone_command(project: &ProjectConfig) -> String {
    let mut command = format!(
        "[[ -d {dir} ]] || git clone {url}",
        dir = shell_quote(&project.dir),
        url = shell_quote(&project.url),
    );
    if project.depth >= 1 {
        command.push_str(&format!(" --depth {}", project.depth));
    }
    if let Some(branch) = &project.branch {
        command.push_str(&format!(" --branch {}", shell_quote(branch)));
    }
    command.push(' ');
    command.push_str(&shell_quote(&project.dir));
    command
}

/// Clones and builds projects inside a build directory.
pub struct BuildRunner {
    build_dir: PathBuf,
    logs_dir: PathBuf,
    fail_fast: bool,
}

impl BuildRunner {
    /// Create a runner. `logs_dir` is made absolute so build scripts see the
    /// same `LOG_DIR` regardless of their working directory.
    pub fn new(build_dir: impl Into<PathBuf>, logs_dir: &Path, fail_fast: bool) -> Result<Self> {
        Ok(Self {
            build_dir: build_dir.into(),
            logs_dir: std::path::absolute(logs_dir)?,
            fail_fast,
        })
    }

    /// Clone every project that is not checked out yet.
    ///
    /// Returns `true` when every clone succeeded.
    pub fn clone_all(&self, projects: &[ProjectConfig]) -> Result<bool> {
        fs::create_dir_all(&self.build_dir)?;
        let mut failures = 0;
        for project in projects {
            let command = clone_command(project);
            debug!("{}", command);
            let status = Command::new("bash")
                .arg("-c")
                .arg(&command)
                .current_dir(&self.build_dir)
                .status()
                .map_err(|e| Error::Command {
                    command: command.clone(),
                    message: e.to_string(),
                })?;
            if !status.success() {
                error!("Clone failed: {} with {}", project.url, status);
                failures += 1;
            }
        }
        Ok(failures == 0)
    }

    /// Build projects in order and return the ones that succeeded.
    ///
    /// With fail-fast, the first failure ends the run.
    pub fn build_all<'p>(&self, projects: &'p [ProjectConfig]) -> Result<Vec<&'p ProjectConfig>> {
        let mut successful = Vec::new();
        for project in projects {
            if self.build(project)? {
                info!("{} build success", project.dir);
                successful.push(project);
            } else if self.fail_fast {
                break;
            }
        }
        Ok(successful)
    }

    /// Clean and build one project. Returns whether the build succeeded.
    pub fn build(&self, project: &ProjectConfig) -> Result<bool> {
        info!("Building {}", project.dir);
        let workdir = self.build_dir.join(&project.dir);

        if !project.clean.is_empty() {
            debug!("{}", project.clean);
            match Command::new("bash")
                .arg("-c")
                .arg(&project.clean)
                .current_dir(&workdir)
                .status()
            {
                Ok(status) if !status.success() => {
                    debug!("Clean for {} exited with {}", project.dir, status)
                }
                Ok(_) => {}
                Err(e) => debug!("Clean for {} could not run: {}", project.dir, e),
            }
        }

        let log_dir = self.log_dir(project);
        fs::create_dir_all(&log_dir)?;
        let stdout = File::create(log_dir.join("log.stdout.log"))?;
        let stderr = File::create(log_dir.join("log.stderr.log"))?;

        debug!("{}", project.build);
        let result = Command::new("bash")
            .args(["-e", "-x", "-c"])
            .arg(&project.build)
            .current_dir(&workdir)
            .env("LOG_DIR", &log_dir)
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status();

        match result {
            Ok(status) if status.success() => Ok(true),
            Ok(status) => {
                error!("Build failed: {} with {}", project.dir, status);
                Ok(false)
            }
            Err(e) => {
                error!("Build failed: {} could not start: {}", project.dir, e);
                Ok(false)
            }
        }
    }

    /// Per-project log directory, with a trailing separator.
    pub fn log_dir(&self, project: &ProjectConfig) -> PathBuf {
        self.logs_dir.join(&project.dir).join("")
    }
}

/// Read the completed-targets log. A missing file means nothing is done.
pub fn read_done_log(path: &Path) -> Result<BTreeSet<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} not found", path.display());
            Ok(BTreeSet::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Combine previous successes with the outcome of this run.
///
/// New successes are added, every project of this run that did not succeed
/// is removed, and all other previous entries are preserved.
pub fn merge_done(
    prior: &BTreeSet<String>,
    projects: &[ProjectConfig],
    successful: &[&ProjectConfig],
) -> BTreeSet<String> {
    let succeeded: BTreeSet<&str> = successful.iter().map(|p| p.url.as_str()).collect();
    let failed: BTreeSet<&str> = projects
        .iter()
        .map(|p| p.url.as_str())
        .filter(|url| !succeeded.contains(url))
        .collect();

    prior
        .iter()
        .map(String::as_str)
        .chain(succeeded.iter().copied())
        .filter(|url| !failed.contains(url))
        .map(str::to_string)
        .collect()
}

/// Write the completed-targets log, sorted, one URL per line.
pub fn write_done_log(path: &Path, done: &BTreeSet<String>) -> Result<()> {
    let mut content = done.iter().cloned().collect::<Vec<_>>().join("\n");
    content.push('\n');
    fs::write(path, content)?;
    Ok(())
}
