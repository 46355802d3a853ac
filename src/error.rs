//! # Error Handling
//!
//! This module defines the centralized error type for the `build-farm`
//! library. It uses `thiserror` to derive a single `Error` enum covering the
//! failure modes that abort work outright, as opposed to per-invocation
//! command failures, which are counted and reported as a number.
//!
//! ## Key Components
//!
//! - **`Error`**: The enum of all fatal errors. Each variant carries enough
//!   context (a file, a step name, a tool) to produce an actionable message.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the library.
//!
//! The variants fall into four groups:
//!
//! - Configuration errors: malformed project files, bad step combinations,
//!   conflicting allow/deny lists.
//! - Registry errors: unknown or duplicate step names.
//! - Precondition errors: a tool a step requires is not installed, or the
//!   host system is unsupported.
//! - Wrapped library errors: I/O, YAML, directory traversal, regex.

use thiserror::Error;

/// Main error type for build-farm operations
#[derive(Error, Debug)]
pub enum Error {
    /// The project configuration file could not be parsed or is missing a
    /// required key.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A step name was requested that the registry does not know.
    #[error("Unknown step '{name}'")]
    UnknownStep { name: String },

    /// A step was registered twice under the same name.
    #[error("Step '{name}' is already registered")]
    DuplicateStep { name: String },

    /// The requested list of steps cannot be executed as a whole.
    #[error("Invalid step selection: {message}")]
    InvalidStepCombination { message: String },

    /// An external executable a step depends on is not on `PATH`.
    #[error("'{tool}' is required for the {step} step but was not found in PATH")]
    MissingTool { tool: String, step: String },

    /// Both an allow-list and a deny-list were supplied.
    #[error("Invalid project filter: {message}")]
    InvalidFilter { message: String },

    /// A subprocess could not be started at all.
    #[error("Command failed to start: {command} - {message}")]
    Command { command: String, message: String },

    /// The worker pool for parallel execution could not be built.
    #[error("Thread pool error: {message}")]
    ThreadPool { message: String },

    /// The CI workflow file could not be patched.
    #[error("Workflow patch error for {path}: {message}")]
    WorkflowPatch { path: String, message: String },

    /// The host distribution is not one the build requirements target.
    #[error("Unsupported system: {message}")]
    UnsupportedSystem { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A directory traversal error, wrapped from `walkdir::Error`.
    #[error("Directory traversal error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
