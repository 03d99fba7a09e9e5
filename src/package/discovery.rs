//! Repository discovery: finds every published entry under a root.

use anyhow::Result;
use std::path::{Path, PathBuf};

use super::PackageSignature;
use super::descriptor::DESCRIPTOR_FILE;
use crate::runtime::Runtime;

fn visible_dirs<R: Runtime>(runtime: &R, dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for path in runtime.read_dir(dir)? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || !runtime.is_dir(&path) {
            continue;
        }
        dirs.push((name.to_string(), path.clone()));
    }
    Ok(dirs)
}

/// Find all published entries by scanning for descriptor files
///
/// Directory structure: `<root>/<publisher>/<project>/versions/<version>/shelf.json`
///
/// Version directories without a descriptor (a publish in progress or an
/// interrupted one) are skipped.
#[tracing::instrument(skip(runtime, root))]
pub fn find_all_signatures<R: Runtime>(runtime: &R, root: &Path) -> Result<Vec<PackageSignature>> {
    let mut signatures = Vec::new();

    if !runtime.exists(root) {
        return Ok(signatures);
    }

    for (publisher, publisher_path) in visible_dirs(runtime, root)? {
        for (project, project_path) in visible_dirs(runtime, &publisher_path)? {
            let versions_path = project_path.join("versions");
            if !runtime.is_dir(&versions_path) {
                continue;
            }
            for (version, version_path) in visible_dirs(runtime, &versions_path)? {
                if runtime.exists(&version_path.join(DESCRIPTOR_FILE)) {
                    signatures.push(PackageSignature::new(
                        publisher.as_str(),
                        project.as_str(),
                        version,
                    ));
                }
            }
        }
    }

    Ok(signatures)
}
