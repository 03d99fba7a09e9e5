use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::runtime::Runtime;

/// Get the default repository root: `~/.shelf`
#[tracing::instrument(skip(runtime))]
pub fn default_repository_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let home_dir = runtime
        .home_dir()
        .context("Could not find home directory")?;
    Ok(home_dir.join(".shelf"))
}

/// Resolve the project folder argument against the current directory.
/// No argument means the current directory itself.
#[tracing::instrument(skip(runtime))]
pub fn project_folder<R: Runtime>(runtime: &R, folder: Option<PathBuf>) -> Result<PathBuf> {
    match folder {
        Some(path) if path.is_absolute() => Ok(path),
        Some(path) => Ok(runtime.current_dir()?.join(path)),
        None => runtime.current_dir(),
    }
}
