//! Launcher scripts for packages with an entry point.
//!
//! A launcher runs the entry point with the package's resolved classpath.
//! Batch launchers live in the repository root; shell launchers live in
//! `<root>/bin`, apart from the publisher directories. Classpath entries are
//! written relative to the repository root, found from the launcher's own
//! location, so the repository can be moved as a whole.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use crate::package::PackageDescriptor;
use crate::runtime::{Runtime, portable_relative_path};

/// Directory under the repository root holding shell launchers.
pub const SHELL_LAUNCHER_DIR: &str = "bin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherFlavor {
    /// Windows batch file, `<name>.cmd`
    Cmd,
    /// POSIX shell script, `bin/<name>`, executable
    Shell,
}

impl LauncherFlavor {
    /// The flavor matching the platform this binary was built for.
    pub fn native() -> Self {
        if cfg!(windows) {
            LauncherFlavor::Cmd
        } else {
            LauncherFlavor::Shell
        }
    }

    pub fn file_name(&self, name: &str) -> String {
        match self {
            LauncherFlavor::Cmd => format!("{}.cmd", name),
            LauncherFlavor::Shell => name.to_string(),
        }
    }

    /// Directory the launcher is written to.
    pub fn launcher_dir(&self, root: &Path) -> PathBuf {
        match self {
            LauncherFlavor::Cmd => root.to_path_buf(),
            LauncherFlavor::Shell => root.join(SHELL_LAUNCHER_DIR),
        }
    }

    fn dir_prefix(&self) -> &'static str {
        match self {
            LauncherFlavor::Cmd => "%~dp0",
            LauncherFlavor::Shell => "$SHELF_DIR/",
        }
    }

    fn separator(&self) -> &'static str {
        match self {
            LauncherFlavor::Cmd => ";",
            LauncherFlavor::Shell => ":",
        }
    }
}

/// Render the launcher body for `entry_point`.
///
/// `classpath` is the full runtime classpath, published artifact first.
/// Locations under `root` are made launcher-relative; anything else is kept
/// as an absolute path.
pub fn render_launcher(
    flavor: LauncherFlavor,
    root: &Path,
    entry_point: &str,
    classpath: &[PathBuf],
    capture_runtime_arguments: bool,
) -> String {
    let classpath = classpath
        .iter()
        .map(|location| match portable_relative_path(root, location) {
            Some(relative) => format!("{}{}", flavor.dir_prefix(), relative),
            None => location.display().to_string(),
        })
        .collect::<Vec<_>>()
        .join(flavor.separator());

    match flavor {
        LauncherFlavor::Cmd => {
            let mut command = format!("java -classpath {} {} %*", classpath, entry_point);
            if capture_runtime_arguments {
                command.push_str(&format!(" --classpath={}", classpath));
            }
            format!("@echo OFF\n{}\n", command)
        }
        LauncherFlavor::Shell => {
            let mut command = format!(
                "exec java -classpath \"{}\" {} \"$@\"",
                classpath, entry_point
            );
            if capture_runtime_arguments {
                command.push_str(&format!(" \"--classpath={}\"", classpath));
            }
            format!(
                "#!/bin/sh\nSHELF_DIR=\"$(cd \"$(dirname \"$0\")/..\" && pwd)\"\n{}\n",
                command
            )
        }
    }
}

/// Writes launchers for published packages.
#[cfg_attr(test, mockall::automock)]
pub trait Launcher: Send + Sync {
    /// Write (or overwrite) the launcher for `descriptor`, returning its path.
    /// Packages without an entry point get no launcher.
    fn generate(
        &self,
        descriptor: &PackageDescriptor,
        classpath: &[PathBuf],
    ) -> Result<Option<PathBuf>>;
}

pub struct LauncherGenerator<'a, R: Runtime> {
    runtime: &'a R,
    root: PathBuf,
    flavor: LauncherFlavor,
}

impl<'a, R: Runtime> LauncherGenerator<'a, R> {
    pub fn new(runtime: &'a R, root: PathBuf, flavor: LauncherFlavor) -> Self {
        Self {
            runtime,
            root,
            flavor,
        }
    }

    /// Returns: `<root>/bin/<name>` or `<root>/<name>.cmd`
    pub fn launcher_path(&self, descriptor: &PackageDescriptor) -> PathBuf {
        self.flavor
            .launcher_dir(&self.root)
            .join(self.flavor.file_name(descriptor.launcher_name()))
    }
}

impl<R: Runtime> Launcher for LauncherGenerator<'_, R> {
    #[tracing::instrument(skip(self, descriptor, classpath), fields(package = %descriptor.signature))]
    fn generate(
        &self,
        descriptor: &PackageDescriptor,
        classpath: &[PathBuf],
    ) -> Result<Option<PathBuf>> {
        let Some(entry_point) = descriptor.entry_point.as_deref() else {
            debug!("{} has no entry point, no launcher", descriptor.signature);
            return Ok(None);
        };

        let path = self.launcher_path(descriptor);
        let content = render_launcher(
            self.flavor,
            &self.root,
            entry_point,
            classpath,
            descriptor.capture_runtime_arguments,
        );

        self.runtime
            .create_dir_all(&self.flavor.launcher_dir(&self.root))?;
        self.runtime
            .write(&path, content.as_bytes())
            .with_context(|| format!("Failed to write launcher {:?}", path))?;
        if self.flavor == LauncherFlavor::Shell {
            self.runtime.set_permissions(&path, 0o755)?;
        }

        debug!("Wrote launcher {:?}", path);
        Ok(Some(path))
    }
}
