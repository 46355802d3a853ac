//! # External Command Execution
//!
//! Every external program the pipeline touches goes through the
//! [`Executor`] trait. This keeps the step logic free of process handling
//! and lets tests substitute a recording mock for the real system.
//!
//! ## Command templates
//!
//! A [`CommandTemplate`] is a `bash` snippet with two placeholders, in the
//! style of GNU parallel:
//!
//! - `{}` is replaced by the input path.
//! - `{.}` is replaced by the input path without its extension.
//!
//! Substituted paths are shell-quoted. A template with no placeholder gets
//! ` {}` appended, so `llvm-dis` means `llvm-dis {}`.
//!
//! ## Fan-out
//!
//! [`SystemExecutor::run_parallel`] renders the template once per input and
//! runs the invocations on a rayon pool sized to the host's parallelism.
//! It blocks until all of them finish and returns how many failed. An
//! invocation fails when it cannot be spawned, exits non-zero, is killed by
//! a signal, or outlives its timeout.

use crate::error::{Error, Result};
use crate::path::{shell_quote, strip_extension};
use log::{debug, warn};
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is polled while a timeout is in force.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A shell command with `{}` / `{.}` input placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate(String);

impl CommandTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        if template.contains("{}") || template.contains("{.}") {
            Self(template)
        } else {
            Self(format!("{} {{}}", template))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render the command line for one input.
    pub fn render(&self, input: &Path) -> String {
        let full = shell_quote(&input.to_string_lossy());
        let stem = shell_quote(&strip_extension(input).to_string_lossy());

        let mut rendered = String::with_capacity(self.0.len() + full.len());
        let mut rest = self.0.as_str();
        while let Some(start) = rest.find('{') {
            rendered.push_str(&rest[..start]);
            let tail = &rest[start..];
            if let Some(after) = tail.strip_prefix("{}") {
                rendered.push_str(&full);
                rest = after;
            } else if let Some(after) = tail.strip_prefix("{.}") {
                rendered.push_str(&stem);
                rest = after;
            } else {
                rendered.push('{');
                rest = &tail[1..];
            }
        }
        rendered.push_str(rest);
        rendered
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for running external programs - allows mocking in tests
pub trait Executor: Send + Sync {
    /// Whether `tool` resolves to an executable.
    fn tool_available(&self, tool: &str) -> bool;

    /// Run `template` once per input, concurrently, and return the number of
    /// failed invocations. Each invocation is killed after `timeout` if one
    /// is given.
    fn run_parallel(
        &self,
        template: &CommandTemplate,
        inputs: &[PathBuf],
        timeout: Option<Duration>,
    ) -> usize;

    /// Run a single program to completion and return whether it succeeded.
    fn run(&self, program: &str, args: &[String]) -> Result<bool>;
}

/// Executor backed by real processes, run from a fixed working directory.
pub struct SystemExecutor {
    workdir: PathBuf,
    pool: rayon::ThreadPool,
}

impl SystemExecutor {
    /// Create an executor rooted at `workdir`.
    ///
    /// `jobs` caps the number of concurrent invocations; `None` uses the
    /// host's available parallelism.
    pub fn new(workdir: impl Into<PathBuf>, jobs: Option<usize>) -> Result<Self> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(jobs) = jobs {
            builder = builder.num_threads(jobs);
        }
        let pool = builder.build().map_err(|e| Error::ThreadPool {
            message: e.to_string(),
        })?;

        Ok(Self {
            workdir: workdir.into(),
            pool,
        })
    }

    /// Run one rendered command line, returning whether it succeeded.
    fn run_one(&self, command: &str, timeout: Option<Duration>) -> bool {
        debug!("{}", command);
        let child = Command::new("bash")
            .arg("-c")
            .arg(command)
            .current_dir(&self.workdir)
            .spawn();
        let child = match child {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to start '{}': {}", command, e);
                return false;
            }
        };

        match wait_with_timeout(child, timeout) {
            Ok(Some(status)) if status.success() => true,
            Ok(Some(status)) => {
                debug!("'{}' failed with {}", command, status);
                false
            }
            Ok(None) => {
                warn!("'{}' timed out and was killed", command);
                false
            }
            Err(e) => {
                warn!("Failed to wait for '{}': {}", command, e);
                false
            }
        }
    }
}

/// Wait for `child`, killing it once `timeout` elapses.
///
/// Returns `None` when the child was killed for running too long.
fn wait_with_timeout(
    mut child: Child,
    timeout: Option<Duration>,
) -> std::io::Result<Option<ExitStatus>> {
    let Some(limit) = timeout else {
        return child.wait().map(Some);
    };

    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

impl Executor for SystemExecutor {
    fn tool_available(&self, tool: &str) -> bool {
        which::which(tool).is_ok()
    }

    fn run_parallel(
        &self,
        template: &CommandTemplate,
        inputs: &[PathBuf],
        timeout: Option<Duration>,
    ) -> usize {
        debug!("Parallel '{}' with {} files", template, inputs.len());
        if inputs.is_empty() {
            return 0;
        }

        self.pool.install(|| {
            inputs
                .par_iter()
                .filter(|input| !self.run_one(&template.render(input), timeout))
                .count()
        })
    }

    fn run(&self, program: &str, args: &[String]) -> Result<bool> {
        debug!("{} {}", program, args.join(" "));
        let status = Command::new(program)
            .args(args)
            .current_dir(&self.workdir)
            .status()
            .map_err(|e| Error::Command {
                command: program.to_string(),
                message: e.to_string(),
            })?;
        Ok(status.success())
    }
}
