//! # Compile Command Implementation
//!
//! This module implements the `compile` subcommand:
//!
//! 1. Load the project list, skipping projects recorded in `done.log`
//!    (unless `--rebuild`).
//! 2. Clone missing checkouts (unless `--no-clone`; `--clone-only` stops
//!    here).
//! 3. Build each project, logging its output under `--logs-dir`.
//! 4. Update `done.log` with the outcome.
//!
//! The exit status is the number of projects that did not build, or 1 with
//! `--exit-on-error`.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use log::{debug, info};

use build_farm::compile::{merge_done, read_done_log, write_done_log, BuildRunner};
use build_farm::config;
use build_farm::defaults::{
    DEFAULT_BUILD_DIR, DEFAULT_CONFIG_FILENAME, DEFAULT_LOGS_DIR, DONE_LOG_FILENAME,
};
use build_farm::output::{OutputConfig, Status};

use super::{exit_code, FilterArgs};

/// Clone and build the projects listed in the config file
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Config file to use
    #[arg(
        short,
        long,
        value_name = "YAML_FILE",
        default_value = DEFAULT_CONFIG_FILENAME,
        env = "BUILD_FARM_CONFIG"
    )]
    pub config: PathBuf,

    /// Where cloned projects and build files are stored
    #[arg(
        short = 'd',
        long,
        value_name = "DIR",
        default_value = DEFAULT_BUILD_DIR,
        env = "BUILD_FARM_BUILD_DIR"
    )]
    pub build_dir: PathBuf,

    /// Directory for logs of build commands
    #[arg(long, value_name = "DIR", default_value = DEFAULT_LOGS_DIR)]
    pub logs_dir: PathBuf,

    /// Clean & rebuild everything, ignoring done.log
    #[arg(short, long)]
    pub rebuild: bool,

    /// Skip cloning phase
    #[arg(long, conflicts_with = "clone_only")]
    pub no_clone: bool,

    /// Clone repositories and exit
    #[arg(long)]
    pub clone_only: bool,

    /// If any build fails, exit immediately
    #[arg(short = 'e', long)]
    pub exit_on_error: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Execute the `compile` command.
pub fn execute(args: CompileArgs, out: &OutputConfig) -> Result<ExitCode> {
    let filter = args.filter.into_filter()?;
    let done_path = args.build_dir.join(DONE_LOG_FILENAME);

    let skip: HashSet<String> = if args.rebuild {
        HashSet::new()
    } else {
        read_done_log(&done_path)?.into_iter().collect()
    };
    let projects = config::load(&args.config, &filter, &skip)?;
    debug!("Got projects: {:?}", projects);
    if projects.is_empty() {
        info!("Nothing to do!");
        return Ok(ExitCode::SUCCESS);
    }

    let runner = BuildRunner::new(&args.build_dir, &args.logs_dir, args.exit_on_error)?;
    if !args.no_clone {
        if !runner.clone_all(&projects)? {
            return Ok(exit_code(1));
        }
        if args.clone_only {
            return Ok(ExitCode::SUCCESS);
        }
    }

    let successful = runner.build_all(&projects)?;
    if !successful.is_empty() {
        let prior = read_done_log(&done_path)?;
        write_done_log(&done_path, &merge_done(&prior, &projects, &successful))?;
    }

    for project in &projects {
        let built = successful.iter().any(|p| p.url == project.url);
        let status = if built { Status::Ok } else { Status::Failed };
        println!("{} {}", out.marker(status), project.dir);
    }

    let failures = projects.len() - successful.len();
    if failures > 0 && args.exit_on_error {
        return Ok(exit_code(1));
    }
    Ok(exit_code(failures))
}
