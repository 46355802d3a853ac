//! # Project Configuration Schema and Parsing
//!
//! This module defines the data structures that represent the project list
//! file (`config.yaml` by default) and the logic for loading it.
//!
//! ## Format
//!
//! The file is a YAML sequence with one entry per project:
//!
//! ```yaml
//! - url: https://github.com/madler/zlib.git
//!   build: ./configure && make
//!   branch: develop        # optional
//!   depth: 0               # optional, < 1 means a full clone
//!   dir: zlib              # optional, derived from GitHub URLs
//!   clean: make clean      # optional, empty string disables cleaning
//!   requirements:          # optional, see `Requirements`
//!     packages: [autoconf]
//! ```
//!
//! `url` and `build` are mandatory. Every other key has a default, applied
//! by [`parse`] so that consumers always see a fully populated
//! [`ProjectConfig`].

use crate::defaults::{DEFAULT_CLEAN_SCRIPT, DEFAULT_CLONE_DEPTH};
use crate::error::{Error, Result};
use crate::path::ProjectFilter;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Patterns used to derive a checkout directory from a GitHub URL, tried in
/// order. The second capture group is the repository name.
const GITHUB_PATTERNS: [&str; 3] = [
    r"github.com/(.+)/(.+)(?:\.git)",
    r"github.com/(.+)/(.+)",
    r"github.com:(.+)/(.+).git",
];

/// System packages a project needs before it can be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Requirements {
    /// A flat list of packages for `apt-get install`.
    Packages(Vec<String>),
    /// Packages grouped by apt action, keyed by `packages` or `build-dep`.
    Grouped(BTreeMap<String, Vec<String>>),
}

/// A project entry as written in the file, before defaults are applied.
#[derive(Debug, Clone, Deserialize)]
struct RawProject {
    url: String,
    build: String,
    #[serde(default)]
    dir: Option<String>,
    #[serde(default)]
    clean: Option<String>,
    #[serde(default)]
    depth: Option<i64>,
    #[serde(default)]
    branch: Option<String>,
    #[serde(default)]
    requirements: Option<Requirements>,
}

/// A fully resolved project entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Repository URL to clone.
    pub url: String,
    /// Checkout directory, relative to the build directory.
    pub dir: String,
    /// Build script, run with `bash -e -x -c` inside `dir`.
    pub build: String,
    /// Clean script run before every build. Empty disables cleaning.
    pub clean: String,
    /// Clone depth. Values below 1 mean a full clone.
    pub depth: i64,
    /// Branch to check out instead of the remote default.
    pub branch: Option<String>,
    /// System packages needed by the build.
    pub requirements: Option<Requirements>,
}

/// Derive the checkout directory name from a GitHub URL.
pub fn dirname_from_url(url: &str) -> Result<Option<String>> {
    for pattern in GITHUB_PATTERNS {
        let regex = Regex::new(pattern)?;
        if let Some(captures) = regex.captures(url) {
            if let Some(name) = captures.get(2) {
                return Ok(Some(name.as_str().trim_end_matches('/').to_string()));
            }
        }
    }
    Ok(None)
}

impl ProjectConfig {
    fn from_raw(raw: RawProject) -> Result<Self> {
        let dir = match raw.dir {
            Some(dir) => dir,
            None => dirname_from_url(&raw.url)?.ok_or_else(|| Error::ConfigParse {
                message: format!("cannot derive a project directory from '{}'", raw.url),
                hint: Some("Add 'dir:' to the project entry".to_string()),
            })?,
        };

        Ok(Self {
            url: raw.url,
            dir,
            build: raw.build,
            clean: raw
                .clean
                .unwrap_or_else(|| DEFAULT_CLEAN_SCRIPT.to_string()),
            depth: raw.depth.unwrap_or(DEFAULT_CLONE_DEPTH),
            branch: raw.branch,
            requirements: raw.requirements,
        })
    }
}

/// Parse a project list from a YAML string, applying defaults.
pub fn parse(yaml: &str) -> Result<Vec<ProjectConfig>> {
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }
    let raw: Option<Vec<RawProject>> = serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some("Every project needs at least 'url:' and 'build:'".to_string()),
    })?;

    raw.unwrap_or_default()
        .into_iter()
        .map(ProjectConfig::from_raw)
        .collect()
}

/// Parse a project list from a file.
pub fn from_file(path: &Path) -> Result<Vec<ProjectConfig>> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

/// Load the project list, dropping projects already built and those
/// rejected by `filter`.
pub fn load(
    path: &Path,
    filter: &ProjectFilter,
    skip_urls: &HashSet<String>,
) -> Result<Vec<ProjectConfig>> {
    let projects: Vec<ProjectConfig> = from_file(path)?
        .into_iter()
        .filter(|p| !skip_urls.contains(&p.url) && filter.accepts(&p.dir))
        .collect();
    debug!("Loaded {} projects from {}", projects.len(), path.display());
    Ok(projects)
}
