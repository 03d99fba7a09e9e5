use anyhow::Result;
use log::info;
use std::io::Write;
use std::path::PathBuf;

use crate::application::{PublishPipeline, PublishReport};
use crate::launcher::LauncherGenerator;
use crate::package::{DESCRIPTOR_FILE, PackageDescriptor, PackageRepository};
use crate::packager::CommandPackager;
use crate::runtime::Runtime;

use super::config::Config;
use super::paths::project_folder;

/// Publish the project in `folder` (default: the current directory)
#[tracing::instrument(skip(runtime, config, out))]
pub fn publish<R: Runtime, W: Write>(
    runtime: &R,
    config: &Config,
    folder: Option<PathBuf>,
    out: &mut W,
) -> Result<PublishReport> {
    let folder = project_folder(runtime, folder)?;
    let descriptor = PackageDescriptor::load(runtime, &folder.join(DESCRIPTOR_FILE))?;
    info!("Publishing {} from {:?}", descriptor.signature, folder);

    let repository = PackageRepository::new(runtime, config.repository_root.clone());
    let packager = CommandPackager::new(runtime, config.packager.clone());
    let launcher = LauncherGenerator::new(
        runtime,
        config.repository_root.clone(),
        config.launcher_flavor,
    );

    let pipeline = PublishPipeline::new(&repository, &packager, &launcher);
    Ok(pipeline.run(&folder, &descriptor, out)?)
}
