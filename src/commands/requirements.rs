//! # Requirements Command Implementation
//!
//! Prints the `apt-get` commands needed to build the configured projects,
//! one line per command, so the output can be piped into a shell.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use log::{debug, error, info};

use build_farm::config;
use build_farm::defaults::DEFAULT_CONFIG_FILENAME;
use build_farm::requirements::{apt_commands, check_system, LSB_RELEASE_PATH};

use super::{exit_code, FilterArgs};

/// Print build requirements from config file
#[derive(Args, Debug)]
pub struct RequirementsArgs {
    /// Config file to use
    #[arg(
        short,
        long,
        value_name = "YAML_FILE",
        default_value = DEFAULT_CONFIG_FILENAME,
        env = "BUILD_FARM_CONFIG"
    )]
    pub config: PathBuf,

    /// Skip distro check
    #[arg(long)]
    pub assume_supported: bool,

    /// Distribution description checked before printing anything
    #[arg(long, value_name = "FILE", default_value = LSB_RELEASE_PATH)]
    pub lsb_release: PathBuf,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Execute the `requirements` command.
pub fn execute(args: RequirementsArgs) -> Result<ExitCode> {
    if args.assume_supported {
        info!("Skipping {} check", args.lsb_release.display());
    } else if let Err(e) = check_system(&args.lsb_release) {
        error!("{}", e);
        return Ok(exit_code(1));
    }

    let filter = args.filter.into_filter()?;
    for project in config::load(&args.config, &filter, &HashSet::new())? {
        debug!("{:?}", project);
        for command in apt_commands(&project) {
            println!("{}", command);
        }
    }
    Ok(ExitCode::SUCCESS)
}
