//! # Build Farm Library
//!
//! This library clones a fleet of C/C++ projects, builds them to LLVM
//! bitcode, and post-processes the resulting `.bc` files. It backs the
//! `build-farm` command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use build_farm::pipeline::{PipelineContext, StepRegistry, StepSelection};
//!
//! let registry = StepRegistry::with_default_steps().unwrap();
//!
//! // 'all' cannot be mixed with other steps
//! assert!(StepSelection::parse(&["all", "strip"], &registry).is_err());
//!
//! let selection = StepSelection::parse(&["strip", "archive"], &registry).unwrap();
//! assert_eq!(selection.names().len(), 2);
//!
//! let ctx = PipelineContext::new(vec!["zlib/adler32.bc".into()]).with_postfix("-nightly");
//! assert_eq!(ctx.archive_name(), "results-nightly.tar.gz");
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: The YAML project list: where to clone
//!   from, how to build, what system packages are needed.
//! - **Building (`compile`)**: Clones projects, runs their build scripts, and
//!   maintains the completed-targets log.
//! - **Discovery (`discovery`)**: Finds bitcode under the build directory,
//!   optionally restricted to some projects.
//! - **Pipeline (`pipeline`)**: A registry of named steps (strip, optimize,
//!   disassemble, analyze, archive, all) run in sequence over the artifact
//!   list, with optional fail-fast.
//! - **Execution (`executor`)**: Runs external tools, fanning a command out
//!   over many files in parallel.
//! - **Glue (`requirements`, `workflow`)**: Prints apt commands for project
//!   dependencies and keeps the CI matrix in sync with the config.

pub mod compile;
pub mod config;
pub mod defaults;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod output;
pub mod path;
pub mod pipeline;
pub mod requirements;
pub mod workflow;

#[cfg(test)]
mod path_proptest;
