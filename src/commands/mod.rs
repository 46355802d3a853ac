//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `build-farm` command-line tool. Each subcommand is defined in its own file
//! to keep the logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args`, performs the
//!   command's logic by calling into the `build_farm` library, and returns
//!   the process exit code.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use build_farm::path::ProjectFilter;

pub mod compile;
pub mod completions;
pub mod postprocess;
pub mod requirements;
pub mod workflow;

/// Allow/deny selection of projects, shared by every command that walks the
/// project list.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only process these projects (comma-separated directory names)
    #[arg(
        long,
        alias = "whitelist",
        value_name = "DIRS",
        value_delimiter = ',',
        conflicts_with = "deny"
    )]
    pub allow: Option<Vec<String>>,

    /// Exclude these projects (comma-separated directory names)
    #[arg(long, alias = "blacklist", value_name = "DIRS", value_delimiter = ',')]
    pub deny: Option<Vec<String>>,
}

impl FilterArgs {
    pub fn into_filter(self) -> Result<ProjectFilter> {
        Ok(ProjectFilter::from_lists(self.allow, self.deny)?)
    }
}

/// Map a failure count onto an exit status, saturating at 255.
pub fn exit_status(failures: usize) -> u8 {
    u8::try_from(failures).unwrap_or(u8::MAX)
}

pub fn exit_code(failures: usize) -> ExitCode {
    ExitCode::from(exit_status(failures))
}
