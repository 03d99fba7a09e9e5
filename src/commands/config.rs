use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::launcher::LauncherFlavor;
use crate::runtime::Runtime;

use super::paths::default_repository_root;

/// Settings for one invocation, resolved once from the command line and
/// the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub repository_root: PathBuf,
    /// Shell command that builds `outputs/` before publishing
    pub packager: Option<String>,
    pub launcher_flavor: LauncherFlavor,
}

impl Config {
    pub fn new<R: Runtime>(
        runtime: &R,
        repository_root: Option<PathBuf>,
        packager: Option<String>,
    ) -> Result<Self> {
        let repository_root = match repository_root {
            Some(path) => path,
            None => default_repository_root(runtime)?,
        };
        debug!("Using repository root: {}", repository_root.display());

        Ok(Self {
            repository_root,
            packager: packager.filter(|command| !command.trim().is_empty()),
            launcher_flavor: LauncherFlavor::native(),
        })
    }
}
