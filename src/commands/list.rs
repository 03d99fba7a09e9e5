use anyhow::Result;
use log::debug;
use std::io::Write;

use crate::package::{PackageRepository, Repository};
use crate::runtime::Runtime;

use super::config::Config;

/// List all published packages, sorted
#[tracing::instrument(skip(runtime, config, out))]
pub fn list<R: Runtime, W: Write>(runtime: &R, config: &Config, out: &mut W) -> Result<()> {
    debug!("Listing packages from {:?}", config.repository_root);

    let repository = PackageRepository::new(runtime, config.repository_root.clone());
    let mut signatures = repository.signatures()?;
    if signatures.is_empty() {
        writeln!(out, "No packages published.")?;
        return Ok(());
    }

    debug!("Found {} package(s)", signatures.len());
    signatures.sort();
    for signature in signatures {
        writeln!(out, "{}", signature)?;
    }

    Ok(())
}
