use anyhow::{Context, Result};
use std::io::Write;

use crate::package::{PackageRepository, PackageSignature, find_dependents};
use crate::runtime::Runtime;

use super::config::Config;

/// Print published packages that depend on another version of `signature`
#[tracing::instrument(skip(runtime, config, out))]
pub fn dependents<R: Runtime, W: Write>(
    runtime: &R,
    config: &Config,
    signature: &str,
    out: &mut W,
) -> Result<()> {
    let signature = signature.parse::<PackageSignature>()?;
    let repository = PackageRepository::new(runtime, config.repository_root.clone());

    let scan = find_dependents(&repository, &signature)
        .with_context(|| format!("Failed to scan for dependents of {}", signature))?;

    for (unreadable, reason) in &scan.unreadable {
        writeln!(out, "WARNING: Skipped {}: {}", unreadable, reason)?;
    }
    if scan.dependents.is_empty() {
        writeln!(out, "No projects depend on another version of {}.", signature.identity)?;
        return Ok(());
    }
    for dependent in &scan.dependents {
        writeln!(out, "{}", dependent)?;
    }
    Ok(())
}
