//! CLI argument parsing and command dispatch

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use build_farm::output::OutputConfig;

use crate::commands;

/// Build Farm - Clone, build and post-process bitcode for many projects
#[derive(Parser, Debug)]
#[command(name = "build-farm")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (off, error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(long, global = true, value_name = "LEVEL", value_parser = parse_level)]
    log_level: Option<LevelFilter>,

    /// Verbose log level
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet log level
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone and build the projects listed in the config file
    Compile(commands::compile::CompileArgs),

    /// Process bitcode files after the compilation step
    Postprocess(commands::postprocess::PostprocessArgs),

    /// Print apt-get commands installing the projects' build requirements
    Requirements(commands::requirements::RequirementsArgs),

    /// Sync the CI workflow's config_targets with the config file
    Workflow(commands::workflow::WorkflowArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<ExitCode> {
        self.init_logging();
        let out = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Compile(args) => commands::compile::execute(args, &out),
            Commands::Postprocess(args) => commands::postprocess::execute(args, &out),
            Commands::Requirements(args) => commands::requirements::execute(args),
            Commands::Workflow(args) => commands::workflow::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }

    /// Level forced by the command line, if any flag asks for one.
    fn level_override(&self) -> Option<LevelFilter> {
        if self.verbose {
            Some(LevelFilter::Debug)
        } else if self.quiet {
            Some(LevelFilter::Warn)
        } else {
            self.log_level
        }
    }

    fn init_logging(&self) {
        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
        if let Some(level) = self.level_override() {
            builder.filter_level(level);
        }
        // A logger may already be installed when commands run in-process
        let _ = builder.format_timestamp(None).try_init();
    }
}

fn parse_level(value: &str) -> Result<LevelFilter, String> {
    value
        .parse()
        .map_err(|_| format!("'{}' is not a log level", value))
}
