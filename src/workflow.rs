//! CI workflow patching.
//!
//! The CI matrix lists project directories on a single line:
//!
//! ```yaml
//!     strategy:
//!       matrix:
//!         config_targets: [zlib, curl]
//! ```
//!
//! [`patch_config_targets`] rewrites that line from the current project
//! list and leaves the rest of the file untouched.

use std::path::Path;

use log::debug;

use crate::error::{Error, Result};

const TARGETS_KEY: &str = "config_targets: ";

/// Characters that end or split a plain scalar inside a flow sequence.
const FLOW_SIGNIFICANT: [char; 7] = [',', '[', ']', '{', '}', ':', '#'];

/// Render directories as a YAML flow sequence.
///
/// Names YAML would read as something other than the same string are
/// single-quoted.
pub fn flow_list(dirs: &[String]) -> String {
    let items: Vec<String> = dirs.iter().map(|dir| flow_scalar(dir)).collect();
    format!("[{}]", items.join(", "))
}

fn flow_scalar(name: &str) -> String {
    match serde_yaml::to_string(name) {
        Ok(rendered) => {
            let rendered = rendered.trim_end_matches('\n');
            let quoted = rendered.starts_with(['\'', '"']);
            if quoted || (!name.contains(FLOW_SIGNIFICANT) && !rendered.contains('\n')) {
                rendered.to_string()
            } else {
                single_quoted(name)
            }
        }
        Err(_) => single_quoted(name),
    }
}

fn single_quoted(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// Replace the first `config_targets: [...]` line in `content`, keeping its
/// indentation. Returns `None` when there is no such line.
pub fn patch_config_targets(content: &str, dirs: &[String]) -> Option<String> {
    let mut lines: Vec<String> = content.split_inclusive('\n').map(str::to_string).collect();
    let index = lines
        .iter()
        .position(|line| line.trim().starts_with("config_targets: ["))?;

    let line = &lines[index];
    let indent = &line[..line.len() - line.trim_start().len()];
    let ending = if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    };
    let replacement = format!("{}{}{}{}", indent, TARGETS_KEY, flow_list(dirs), ending);
    lines[index] = replacement;
    Some(lines.concat())
}

/// Patch the workflow file at `path` in place.
pub fn patch_file(path: &Path, dirs: &[String]) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    let patched = patch_config_targets(&content, dirs).ok_or_else(|| Error::WorkflowPatch {
        path: path.display().to_string(),
        message: "Could not find config_targets".to_string(),
    })?;
    debug!("Writing {} targets to {}", dirs.len(), path.display());
    std::fs::write(path, patched)?;
    Ok(())
}
