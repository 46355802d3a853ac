//! Path manipulation utilities for build-farm

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Return the top-level project directory of an artifact path.
///
/// This is the first path segment after normalization, so `./proj/x.bc`
/// and `proj/sub/../x.bc` both yield `proj`. Absolute paths and paths that
/// start by leaving the current directory have no project directory.
pub fn base_dir(path: &Path) -> Option<String> {
    for component in path.components() {
        match component {
            Component::CurDir => continue,
            Component::Normal(segment) => return Some(segment.to_string_lossy().into_owned()),
            Component::RootDir | Component::Prefix(_) | Component::ParentDir => return None,
        }
    }
    None
}

/// Drop the extension of the final path segment (`dir/a.bc` -> `dir/a`).
pub fn strip_extension(path: &Path) -> PathBuf {
    path.with_extension("")
}

/// Build a sibling path by replacing the extension with `suffix`.
///
/// `derive_path("p/a.bc", "-strip.bc")` gives `p/a-strip.bc`.
pub fn derive_path(path: &Path, suffix: &str) -> PathBuf {
    let mut derived: OsString = strip_extension(path).into_os_string();
    derived.push(suffix);
    PathBuf::from(derived)
}

/// Quote a string for safe interpolation into a `bash -c` script.
///
/// Strings made only of characters the shell never interprets are returned
/// untouched to keep logged commands readable.
pub fn shell_quote(value: &str) -> String {
    let is_plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./+,:@%=".contains(c));
    if is_plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

/// Selection of top-level project directories to operate on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProjectFilter {
    /// Keep every project.
    #[default]
    All,
    /// Keep only the listed projects.
    Allow(Vec<String>),
    /// Keep everything except the listed projects.
    Deny(Vec<String>),
}

impl ProjectFilter {
    /// Build a filter from optional allow and deny lists.
    ///
    /// At most one of the two may be given.
    pub fn from_lists(allow: Option<Vec<String>>, deny: Option<Vec<String>>) -> Result<Self> {
        match (allow, deny) {
            (Some(_), Some(_)) => Err(Error::InvalidFilter {
                message: "an allow-list and a deny-list are mutually exclusive".to_string(),
            }),
            (Some(allow), None) => Ok(Self::Allow(allow)),
            (None, Some(deny)) => Ok(Self::Deny(deny)),
            (None, None) => Ok(Self::All),
        }
    }

    /// Whether a project directory name passes the filter.
    pub fn accepts(&self, project: &str) -> bool {
        match self {
            Self::All => true,
            Self::Allow(names) => names.iter().any(|n| n == project),
            Self::Deny(names) => !names.iter().any(|n| n == project),
        }
    }

    /// Whether an artifact path passes the filter, judged by its top-level
    /// directory.
    pub fn accepts_path(&self, path: &Path) -> bool {
        match self {
            Self::All => true,
            _ => base_dir(path).is_some_and(|dir| self.accepts(&dir)),
        }
    }

    /// Keep the artifacts whose top-level directory passes the filter,
    /// preserving their order.
    pub fn apply(&self, artifacts: Vec<PathBuf>) -> Vec<PathBuf> {
        artifacts
            .into_iter()
            .filter(|p| self.accepts_path(p))
            .collect()
    }
}
