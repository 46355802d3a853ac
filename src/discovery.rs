//! Artifact discovery
//!
//! Walks a build root and collects every bitcode file below it. Paths are
//! returned relative to the root, because every later step runs with the
//! build root as its working directory and archives are built from the
//! first path segment.

use crate::defaults::ARTIFACT_SUFFIX;
use crate::error::{Error, Result};
use crate::path::ProjectFilter;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively find artifacts under `root`, in traversal order.
pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    let mut artifacts = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry?;
        // Symlinked files count; symlinked directories are not descended.
        if !entry.path().is_file() {
            continue;
        }
        let is_artifact = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(ARTIFACT_SUFFIX));
        if !is_artifact {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| Error::Io(std::io::Error::other(format!(
                "Failed to make path relative: {}",
                entry.path().display()
            ))))?;
        artifacts.push(relative.to_path_buf());
    }

    debug!("Discovered {} artifacts under {}", artifacts.len(), root.display());
    Ok(artifacts)
}

/// Discover artifacts and keep those accepted by `filter`.
pub fn discover_filtered(root: &Path, filter: &ProjectFilter) -> Result<Vec<PathBuf>> {
    let artifacts = filter.apply(discover(root)?);
    debug!("{} artifacts left after filtering", artifacts.len());
    Ok(artifacts)
}
