//! Publish use case - moves a built project into the repository.
//!
//! This use case coordinates:
//! - Dependency resolution against already-published descriptors
//! - Packaging through the injected packager
//! - The conflict check and the repository write
//! - Launcher generation for packages with an entry point
//! - The advisory scan for stale dependents

use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{PublishError, PublishStage, RepositoryError};
use crate::launcher::Launcher;
use crate::package::{
    DependencyResolver, PackageDescriptor, PackageSignature, Repository, ResolvedClasspath,
    find_dependents,
};
use crate::packager::{OUTPUT_DIR, PackageOutcome, PackageRequest, Packager};

/// What a successful publish produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub signature: PackageSignature,
    pub classpath: ResolvedClasspath,
    pub launcher: Option<PathBuf>,
    /// Published packages pinned to another version of this one.
    pub dependents: Vec<PackageSignature>,
}

pub struct PublishPipeline<'a, P: Repository, K: Packager, L: Launcher> {
    repository: &'a P,
    packager: &'a K,
    launcher: &'a L,
}

fn status<W: Write>(out: &mut W, line: std::fmt::Arguments<'_>) {
    if let Err(e) = writeln!(out, "{}", line) {
        warn!("Failed to write status line: {}", e);
    }
}

impl<'a, P: Repository, K: Packager, L: Launcher> PublishPipeline<'a, P, K, L> {
    pub fn new(repository: &'a P, packager: &'a K, launcher: &'a L) -> Self {
        Self {
            repository,
            packager,
            launcher,
        }
    }

    /// Publish the project in `project_folder` described by `descriptor`.
    ///
    /// Status lines go to `out`. Any failure skips every later stage; nothing
    /// is written to the repository unless packaging, the conflict check and
    /// resolution all succeeded.
    #[tracing::instrument(skip(self, descriptor, out), fields(package = %descriptor.signature))]
    pub fn run<W: Write>(
        &self,
        project_folder: &Path,
        descriptor: &PackageDescriptor,
        out: &mut W,
    ) -> Result<PublishReport, PublishError> {
        let signature = &descriptor.signature;

        debug!("{}: {}", signature, PublishStage::ResolvingDependencies);
        let classpath = DependencyResolver::new(self.repository)
            .resolve(descriptor, &project_folder.join(OUTPUT_DIR))
            .map_err(|e| PublishError::from_resolve(signature, e))?;

        debug!("{}: {}", signature, PublishStage::Packaging);
        status(out, format_args!("Packaging {}...", signature));
        let request = PackageRequest {
            project_folder: project_folder.to_path_buf(),
            descriptor: descriptor.clone(),
            classpath: classpath
                .dependency_locations()
                .map(Path::to_path_buf)
                .collect(),
        };
        let artifacts = match self.packager.package(&request) {
            Ok(PackageOutcome::Success(artifacts)) => artifacts,
            Ok(PackageOutcome::Failure { message }) => {
                return Err(PublishError::PackagingFailed {
                    signature: signature.clone(),
                    message,
                });
            }
            Err(e) => {
                return Err(PublishError::PackagingFailed {
                    signature: signature.clone(),
                    message: format!("{:#}", e),
                });
            }
        };

        debug!("{}: {}", signature, PublishStage::CheckingConflict);
        if self.repository.exists(signature) {
            return Err(PublishError::AlreadyPublished(signature.clone()));
        }

        debug!("{}: {}", signature, PublishStage::WritingRepository);
        status(out, format_args!("Publishing {}...", signature));
        self.repository
            .write(signature, descriptor, &artifacts)
            .map_err(|e| match e {
                RepositoryError::AlreadyPublished(s) => PublishError::AlreadyPublished(s),
                source => PublishError::RepositoryWriteFailed {
                    signature: signature.clone(),
                    source,
                },
            })?;

        let launcher = if descriptor.entry_point.is_some() {
            debug!("{}: {}", signature, PublishStage::GeneratingLauncher);
            let launch_classpath: Vec<PathBuf> =
                std::iter::once(self.repository.locate_artifact(signature))
                    .chain(classpath.dependency_locations().map(Path::to_path_buf))
                    .collect();
            let path = self
                .launcher
                .generate(descriptor, &launch_classpath)
                .map_err(|e| PublishError::LauncherWriteFailed {
                    name: descriptor.launcher_name().to_string(),
                    source: e.into(),
                })?;
            if let Some(path) = &path {
                info!("Created launcher {}", path.display());
            }
            path
        } else {
            None
        };

        debug!("{}: {}", signature, PublishStage::ScanningDependents);
        let dependents = match find_dependents(self.repository, signature) {
            Ok(scan) => scan.dependents,
            Err(e) => {
                warn!("Dependents scan for {} failed: {}", signature, e);
                status(
                    out,
                    format_args!(
                        "WARNING: Could not check for projects depending on {}: {}",
                        signature.identity, e
                    ),
                );
                Vec::new()
            }
        };
        if !dependents.is_empty() {
            status(
                out,
                format_args!("The following projects should be updated to use {}:", signature),
            );
            for dependent in &dependents {
                status(out, format_args!("  {}", dependent));
            }
        }

        debug!("{}: {}", signature, PublishStage::Done);
        Ok(PublishReport {
            signature: signature.clone(),
            classpath,
            launcher,
            dependents,
        })
    }
}
