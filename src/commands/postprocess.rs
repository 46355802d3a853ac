//! # Postprocess Command Implementation
//!
//! This module implements the `postprocess` subcommand, which runs the step
//! pipeline over the bitcode produced by `compile`.
//!
//! ## Functionality
//!
//! - **Step selection**: Any registered steps, in the order given, or the
//!   single aggregate `all`.
//! - **Artifact selection**: An explicit `--bc-list`, or every `.bc` file
//!   under the build directory, optionally narrowed with `--allow`/`--deny`.
//! - **Fail-fast**: With `--exit-on-error`, the first step reporting
//!   failures ends the run.
//!
//! The exit status is the failure count of the last step executed. A
//! missing tool is reported as an error instead.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use log::{debug, info};

use build_farm::defaults::DEFAULT_BUILD_DIR;
use build_farm::discovery::discover_filtered;
use build_farm::executor::SystemExecutor;
use build_farm::output::{OutputConfig, Status};
use build_farm::pipeline::{Pipeline, PipelineContext, StepRegistry, StepSelection};

use super::{exit_code, FilterArgs};

fn steps_help() -> String {
    match StepRegistry::with_default_steps() {
        Ok(registry) => registry.help_text(),
        Err(_) => "Steps to execute".to_string(),
    }
}

/// Process bitcode files after the compilation step
#[derive(Args, Debug)]
pub struct PostprocessArgs {
    #[arg(value_name = "STEP", required = true, num_args = 1.., help = steps_help())]
    pub steps: Vec<String>,

    /// Comma-separated optimization levels for the optimize step (see clang -O)
    #[arg(short = 'O', long, value_name = "LEVELS", value_delimiter = ',')]
    pub opt_levels: Vec<String>,

    /// Extra flags to pass to opt
    #[arg(long, value_name = "FLAGS", default_value = "", allow_hyphen_values = true)]
    pub opt_flags: String,

    /// Bitcode files to post-process, relative to the build directory.
    ///
    /// If not specified, every bitcode file under the build directory is used.
    #[arg(long, value_name = "FILE", num_args = 1..)]
    pub bc_list: Option<Vec<PathBuf>>,

    /// Archive name postfix
    #[arg(long, value_name = "POSTFIX", default_value = "", allow_hyphen_values = true)]
    pub postfix: String,

    /// Where cloned projects and build files are stored
    #[arg(
        short = 'd',
        long,
        value_name = "DIR",
        default_value = DEFAULT_BUILD_DIR,
        env = "BUILD_FARM_BUILD_DIR"
    )]
    pub build_dir: PathBuf,

    /// If any step fails, exit immediately
    #[arg(short = 'e', long)]
    pub exit_on_error: bool,

    /// Maximum number of commands run at once (defaults to the CPU count)
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Execute the `postprocess` command.
pub fn execute(args: PostprocessArgs, out: &OutputConfig) -> Result<ExitCode> {
    let registry = StepRegistry::with_default_steps()?;
    let selection = StepSelection::parse(&args.steps, &registry)?;
    let filter = args.filter.into_filter()?;
    debug!("Steps {:?} with filter {:?}", selection.names(), filter);

    let artifacts = match args.bc_list {
        Some(list) => list,
        None => discover_filtered(&args.build_dir, &filter)?,
    };
    info!(
        "Post-processing {} bitcode files in {}",
        artifacts.len(),
        args.build_dir.display()
    );

    let executor = SystemExecutor::new(&args.build_dir, args.jobs)?;
    let mut ctx = PipelineContext::new(artifacts)
        .with_opt_levels(args.opt_levels)
        .with_opt_flags(args.opt_flags)
        .with_postfix(args.postfix)
        .with_fail_fast(args.exit_on_error);

    let failures = Pipeline::new(&registry, &executor).run(&selection, &mut ctx)?;

    println!(
        "{} {} finished with {} failures",
        out.marker(Status::from_failures(failures)),
        selection.names().join(", "),
        failures
    );
    Ok(exit_code(failures))
}
