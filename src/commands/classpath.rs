use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;

use crate::package::{DESCRIPTOR_FILE, DependencyResolver, PackageDescriptor, PackageRepository};
use crate::packager::OUTPUT_DIR;
use crate::runtime::Runtime;

use super::config::Config;
use super::paths::project_folder;

/// Print the resolved classpath of a project folder, one location per line
#[tracing::instrument(skip(runtime, config, out))]
pub fn classpath<R: Runtime, W: Write>(
    runtime: &R,
    config: &Config,
    folder: Option<PathBuf>,
    out: &mut W,
) -> Result<()> {
    let folder = project_folder(runtime, folder)?;
    let descriptor = PackageDescriptor::load(runtime, &folder.join(DESCRIPTOR_FILE))?;

    let repository = PackageRepository::new(runtime, config.repository_root.clone());
    let resolved =
        DependencyResolver::new(&repository).resolve(&descriptor, &folder.join(OUTPUT_DIR))?;

    for location in resolved.locations() {
        writeln!(out, "{}", location.display())?;
    }
    Ok(())
}
