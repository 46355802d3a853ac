//! Built-in transformation steps.
//!
//! Each step reads the current artifact list from the context and either
//! produces a side effect (new files next to the artifacts, an archive) or
//! replaces the list for the steps that follow.

use std::collections::BTreeSet;

use log::{info, warn};

use crate::defaults::{opt_levels_or_default, OPTIMIZE_TIMEOUT};
use crate::error::Result;
use crate::executor::{CommandTemplate, Executor};
use crate::path::{base_dir, derive_path};
use crate::pipeline::PipelineContext;

/// Members of the `all` step, in execution order.
pub const ALL_SEQUENCE: [&str; 5] = ["strip", "optimize", "disassemble", "analyze", "archive"];

const STRIP_SUFFIX: &str = "-strip.bc";

/// Strip debug info and symbols, then continue with the stripped files.
pub fn strip(ctx: &mut PipelineContext, executor: &dyn Executor) -> Result<usize> {
    let template = CommandTemplate::new(format!("opt {{}} -strip-debug -strip -o {{.}}{STRIP_SUFFIX}"));
    let failures = executor.run_parallel(&template, &ctx.artifacts, None);
    if failures > 0 && ctx.fail_fast {
        return Ok(failures);
    }

    ctx.artifacts = ctx
        .artifacts
        .iter()
        .map(|p| derive_path(p, STRIP_SUFFIX))
        .collect();
    Ok(failures)
}

/// Optimize every artifact at every requested level.
///
/// Derived files land in the context's `optimized` slot; the main list is
/// left alone.
pub fn optimize(ctx: &mut PipelineContext, executor: &dyn Executor) -> Result<usize> {
    let mut optimized = Vec::new();
    let mut failures = 0;

    for level in opt_levels_or_default(&ctx.opt_levels) {
        let suffix = format!("-O{level}.bc");
        let flags = if ctx.opt_flags.is_empty() {
            String::new()
        } else {
            format!(" {}", ctx.opt_flags)
        };
        let template = CommandTemplate::new(format!("opt {{}} -O{level}{flags} -o {{.}}{suffix}"));

        let level_failures = executor.run_parallel(&template, &ctx.artifacts, Some(OPTIMIZE_TIMEOUT));
        failures += level_failures;
        if level_failures > 0 && ctx.fail_fast {
            warn!("Optimization level {} failed for {} files", level, level_failures);
            break;
        }
        optimized.extend(ctx.artifacts.iter().map(|p| derive_path(p, &suffix)));
    }

    ctx.optimized = Some(optimized);
    Ok(failures)
}

/// Produce textual IR for the main and optimized artifacts.
pub fn disassemble(ctx: &mut PipelineContext, executor: &dyn Executor) -> Result<usize> {
    let template = CommandTemplate::new("llvm-dis");
    let main = executor.run_parallel(&template, &ctx.artifacts, None);
    let optimized = executor.run_parallel(&template, ctx.optimized_artifacts(), None);
    Ok(main + optimized)
}

/// Look for optimization candidates with souper, one report per artifact.
pub fn analyze(ctx: &mut PipelineContext, executor: &dyn Executor) -> Result<usize> {
    let template = CommandTemplate::new("souper {} > {.}.souper");
    Ok(executor.run_parallel(&template, &ctx.artifacts, None))
}

/// Bundle the projects referenced by the artifact list into one tarball.
///
/// Artifacts outside any project directory (absolute paths, or paths
/// leading out of the build directory) cannot be archived and each counts
/// as a failure.
pub fn archive(ctx: &mut PipelineContext, executor: &dyn Executor) -> Result<usize> {
    let mut projects = BTreeSet::new();
    let mut unplaced = 0;
    for artifact in &ctx.artifacts {
        match base_dir(artifact) {
            Some(dir) => {
                projects.insert(dir);
            }
            None => {
                warn!("{} is not inside a project directory", artifact.display());
                unplaced += 1;
            }
        }
    }
    if projects.is_empty() {
        info!("No project directories to archive");
        return Ok(unplaced);
    }

    let name = ctx.archive_name();
    info!("Archiving {} projects into {}", projects.len(), name);
    let mut args = vec!["czf".to_string(), name];
    args.extend(projects);

    let succeeded = executor.run("tar", &args)?;
    Ok(unplaced + usize::from(!succeeded))
}
