//! Post-processing pipeline for discovered bitcode.
//!
//! ## Overview
//!
//! A pipeline run takes an ordered selection of step names and a
//! [`PipelineContext`] holding the artifact list, then runs each step in
//! turn:
//!
//! 1. Look the step up in the [`StepRegistry`].
//! 2. Check that every tool it requires is installed. A missing tool aborts
//!    the whole run with [`Error::MissingTool`].
//! 3. Run it and collect its failure count.
//! 4. With fail-fast enabled, stop at the first non-zero count.
//!
//! The result of a run is the failure count of the last step executed.
//!
//! Steps communicate only through the context. A step that produces new
//! artifacts replaces `artifacts` when it finishes; the optimize step fills
//! the optional `optimized` slot, which later steps treat as empty until it
//! is set.

use std::path::PathBuf;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::executor::Executor;

pub mod registry;
pub mod steps;

pub use registry::{StepAction, StepDefinition, StepId, StepRegistry, ALL_STEP};

/// Mutable state for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineContext {
    /// Artifacts the next step operates on.
    pub artifacts: Vec<PathBuf>,
    /// Files produced by the optimize step. `None` until it has run.
    pub optimized: Option<Vec<PathBuf>>,
    /// Optimization levels, such as `0`, `2` or `s`.
    pub opt_levels: Vec<String>,
    /// Extra flags passed verbatim to the optimizer.
    pub opt_flags: String,
    /// Stop after the first step that reports failures.
    pub fail_fast: bool,
    applied: String,
}

impl PipelineContext {
    pub fn new(artifacts: Vec<PathBuf>) -> Self {
        Self {
            artifacts,
            ..Self::default()
        }
    }

    pub fn with_opt_levels(mut self, levels: Vec<String>) -> Self {
        self.opt_levels = levels;
        self
    }

    pub fn with_opt_flags(mut self, flags: impl Into<String>) -> Self {
        self.opt_flags = flags.into();
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Seed the applied-steps label with a user postfix.
    pub fn with_postfix(mut self, postfix: impl Into<String>) -> Self {
        self.applied = postfix.into();
        self
    }

    /// Postfix followed by `-<step>` for every step finished so far.
    pub fn applied_label(&self) -> &str {
        &self.applied
    }

    pub fn record_applied(&mut self, step: &str) {
        self.applied.push('-');
        self.applied.push_str(step);
    }

    /// File name for an archive of the current state.
    pub fn archive_name(&self) -> String {
        format!("results{}.tar.gz", self.applied)
    }

    /// The optimize step's output, or nothing if it has not run.
    pub fn optimized_artifacts(&self) -> &[PathBuf] {
        self.optimized.as_deref().unwrap_or(&[])
    }
}

/// A validated, ordered list of step names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSelection(Vec<String>);

impl StepSelection {
    /// Validate requested step names against `registry`.
    ///
    /// Every name must be registered, at least one must be given, and
    /// `all` cannot be combined with anything else.
    pub fn parse<S: AsRef<str>>(names: &[S], registry: &StepRegistry) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::InvalidStepCombination {
                message: "at least one step is required".to_string(),
            });
        }
        for name in names {
            registry.lookup(name.as_ref())?;
        }
        if names.len() > 1 && names.iter().any(|n| n.as_ref() == ALL_STEP) {
            return Err(Error::InvalidStepCombination {
                message: format!("No other steps possible if '{}' is specified", ALL_STEP),
            });
        }
        Ok(Self(names.iter().map(|n| n.as_ref().to_string()).collect()))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

/// Runs step selections against a registry and an executor.
pub struct Pipeline<'a> {
    registry: &'a StepRegistry,
    executor: &'a dyn Executor,
}

impl<'a> Pipeline<'a> {
    pub fn new(registry: &'a StepRegistry, executor: &'a dyn Executor) -> Self {
        Self { registry, executor }
    }

    /// Run every selected step in order and return the failure count of the
    /// last one executed.
    pub fn run(&self, selection: &StepSelection, ctx: &mut PipelineContext) -> Result<usize> {
        self.run_sequence(selection.names(), ctx)
    }

    fn run_sequence(&self, names: &[String], ctx: &mut PipelineContext) -> Result<usize> {
        let mut failures = 0;
        for name in names {
            failures = self.run_step(name, ctx)?;
            if failures > 0 && ctx.fail_fast {
                warn!("Step '{}' failed {} times, stopping", name, failures);
                break;
            }
        }
        Ok(failures)
    }

    fn run_step(&self, name: &str, ctx: &mut PipelineContext) -> Result<usize> {
        let step = self.registry.lookup(name)?;
        self.check_requirements(step)?;

        info!("Running step '{}' on {} files", name, ctx.artifacts.len());
        let failures = match &step.action {
            StepAction::Run(callback) => callback(ctx, self.executor)?,
            StepAction::Sequence(members) => self.run_sequence(members, ctx)?,
        };
        ctx.record_applied(name);

        if failures > 0 {
            warn!("Step '{}' finished with {} failures", name, failures);
        } else {
            info!("Step '{}' finished", name);
        }
        Ok(failures)
    }

    fn check_requirements(&self, step: &StepDefinition) -> Result<()> {
        match step
            .requirements
            .iter()
            .find(|tool| !self.executor.tool_available(tool))
        {
            Some(tool) => Err(Error::MissingTool {
                tool: tool.clone(),
                step: step.name.clone(),
            }),
            None => Ok(()),
        }
    }
}
