//! System package requirements.
//!
//! Turns each project's `requirements` entry into the `apt-get` commands
//! that install them, after checking that the host is a supported Ubuntu
//! release.

use std::path::Path;

use log::{debug, warn};

use crate::config::{ProjectConfig, Requirements};
use crate::error::{Error, Result};

/// Oldest supported Ubuntu major release.
pub const MIN_UBUNTU_MAJOR: u32 = 18;

/// Default location of the distribution description.
pub const LSB_RELEASE_PATH: &str = "/etc/lsb-release";

/// Check the contents of an `lsb-release` file.
pub fn check_lsb_release(content: &str) -> Result<()> {
    let mut has_id = false;
    let mut has_release = false;

    for line in content.lines() {
        debug!("{}", line);
        let line = line.trim().to_lowercase();
        let Some((var, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim_matches('"');

        match var {
            "distrib_id" => {
                if value != "ubuntu" {
                    return Err(Error::UnsupportedSystem {
                        message: format!("Unknown DISTRIB_ID {}", value),
                    });
                }
                has_id = true;
            }
            "distrib_release" => {
                let major = value
                    .split('.')
                    .next()
                    .and_then(|m| m.parse::<u32>().ok())
                    .ok_or_else(|| Error::UnsupportedSystem {
                        message: format!("Unparseable DISTRIB_RELEASE {}", value),
                    })?;
                if major < MIN_UBUNTU_MAJOR {
                    return Err(Error::UnsupportedSystem {
                        message: format!("Major release {} is too old", major),
                    });
                }
                has_release = true;
            }
            _ => {}
        }

        if has_id && has_release {
            return Ok(());
        }
    }

    Err(Error::UnsupportedSystem {
        message: "DISTRIB_ID or DISTRIB_RELEASE missing".to_string(),
    })
}

/// Check the host's `lsb-release` file at `path`.
pub fn check_system(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::UnsupportedSystem {
        message: format!("{} unreadable: {}", path.display(), e),
    })?;
    check_lsb_release(&content)
}

/// `apt-get` commands installing a project's requirements.
///
/// Projects without requirements yield nothing and are reported.
pub fn apt_commands(project: &ProjectConfig) -> Vec<String> {
    let Some(requirements) = &project.requirements else {
        warn!("Skipping {} as it has no 'requirements'", project.dir);
        return Vec::new();
    };

    match requirements {
        Requirements::Packages(packages) if packages.is_empty() => Vec::new(),
        Requirements::Packages(packages) => {
            vec![format!("apt-get install -qq {}", packages.join(" "))]
        }
        Requirements::Grouped(groups) => groups
            .iter()
            .filter_map(|(key, packages)| match key.as_str() {
                "build-dep" => Some(format!("apt-get build-dep -qq {}", packages.join(" "))),
                "packages" => Some(format!("apt-get install -qq {}", packages.join(" "))),
                other => {
                    warn!("Unknown key '{}' in requirements", other);
                    None
                }
            })
            .collect(),
    }
}
