//! # Workflow Command Implementation
//!
//! Rewrites the `config_targets:` line of the CI workflow so the CI matrix
//! builds exactly the projects in the config file.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use log::info;

use build_farm::config;
use build_farm::defaults::{DEFAULT_CONFIG_FILENAME, DEFAULT_WORKFLOW_TARGET};
use build_farm::workflow::patch_file;

use super::FilterArgs;

/// Sync the CI workflow's config_targets with the config file
#[derive(Args, Debug)]
pub struct WorkflowArgs {
    /// Config file to use
    #[arg(
        short,
        long,
        value_name = "YAML_FILE",
        default_value = DEFAULT_CONFIG_FILENAME,
        env = "BUILD_FARM_CONFIG"
    )]
    pub config: PathBuf,

    /// Workflow file to patch
    #[arg(long, value_name = "FILE", default_value = DEFAULT_WORKFLOW_TARGET)]
    pub target: PathBuf,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Execute the `workflow` command.
pub fn execute(args: WorkflowArgs) -> Result<ExitCode> {
    let filter = args.filter.into_filter()?;
    let dirs: Vec<String> = config::load(&args.config, &filter, &HashSet::new())?
        .into_iter()
        .map(|p| p.dir)
        .collect();

    patch_file(&args.target, &dirs)?;
    info!("Updated {} with {} targets", args.target.display(), dirs.len());
    Ok(ExitCode::SUCCESS)
}
