//! Version-addressed package repository.
//!
//! Layout: `<root>/<publisher>/<project>/versions/<version>/` holding the
//! primary artifact, an optional source artifact and the descriptor.

use anyhow::{Context, anyhow};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::error::RepositoryError;
use crate::runtime::Runtime;

use super::codec::{BoxError, DescriptorCodec, JsonCodec};
use super::descriptor::DESCRIPTOR_FILE;
use super::{PackageDescriptor, PackageIdentity, PackageSignature, find_all_signatures};

/// Built artifacts handed to the repository by the packager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedArtifacts {
    pub artifact: PathBuf,
    pub source_artifact: Option<PathBuf>,
}

/// Storage contract the resolver, scanner and publish pipeline depend on.
#[cfg_attr(test, mockall::automock)]
pub trait Repository: Send + Sync {
    /// True iff the version slot for this signature exists.
    fn exists(&self, signature: &PackageSignature) -> bool;

    fn read_descriptor(
        &self,
        signature: &PackageSignature,
    ) -> Result<PackageDescriptor, RepositoryError>;

    /// Location of the primary artifact. The file is not required to exist.
    fn locate_artifact(&self, signature: &PackageSignature) -> PathBuf;

    /// Publish a new entry. Fails with `AlreadyPublished` if the slot is taken.
    fn write(
        &self,
        signature: &PackageSignature,
        descriptor: &PackageDescriptor,
        artifacts: &PackagedArtifacts,
    ) -> Result<(), RepositoryError>;

    /// Every published signature, in no particular order.
    fn signatures(&self) -> Result<Vec<PackageSignature>, RepositoryError>;
}

/// Lazily enumerate the entries of `repository`. Descriptors are read as the
/// iterator advances, so one unreadable entry does not hide the others; call
/// again to restart.
pub fn published_entries<P: Repository + ?Sized>(
    repository: &P,
) -> Result<
    impl Iterator<Item = (PackageSignature, Result<PackageDescriptor, RepositoryError>)> + '_,
    RepositoryError,
> {
    let signatures = repository.signatures()?;
    Ok(signatures.into_iter().map(move |signature| {
        let descriptor = repository.read_descriptor(&signature);
        (signature, descriptor)
    }))
}

/// Repository rooted at a local directory.
pub struct PackageRepository<'a, R: Runtime, C: DescriptorCodec = JsonCodec> {
    runtime: &'a R,
    root: PathBuf,
    codec: C,
}

impl<'a, R: Runtime> PackageRepository<'a, R, JsonCodec> {
    /// Create a new package repository with the given runtime and root.
    pub fn new(runtime: &'a R, root: PathBuf) -> Self {
        Self::with_codec(runtime, root, JsonCodec)
    }
}

impl<'a, R: Runtime, C: DescriptorCodec> PackageRepository<'a, R, C> {
    pub fn with_codec(runtime: &'a R, root: PathBuf, codec: C) -> Self {
        Self {
            runtime,
            root,
            codec,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns: `<root>/<publisher>/<project>`
    pub fn project_dir(&self, identity: &PackageIdentity) -> PathBuf {
        self.root.join(&identity.publisher).join(&identity.project)
    }

    /// Returns: `<root>/<publisher>/<project>/versions/<version>`
    pub fn version_dir(&self, signature: &PackageSignature) -> PathBuf {
        self.project_dir(&signature.identity)
            .join("versions")
            .join(signature.version.as_str())
    }

    /// Returns: `<version_dir>/<project>.jar`
    pub fn artifact_path(&self, signature: &PackageSignature) -> PathBuf {
        self.version_dir(signature)
            .join(format!("{}.jar", signature.project()))
    }

    /// Returns: `<version_dir>/<project>.sources.jar`
    pub fn source_artifact_path(&self, signature: &PackageSignature) -> PathBuf {
        self.version_dir(signature)
            .join(format!("{}.sources.jar", signature.project()))
    }

    /// Returns: `<version_dir>/shelf.json`
    pub fn descriptor_path(&self, signature: &PackageSignature) -> PathBuf {
        self.version_dir(signature).join(DESCRIPTOR_FILE)
    }

    /// Lazily enumerate published entries. See [`published_entries`].
    pub fn entries(
        &self,
    ) -> Result<
        impl Iterator<Item = (PackageSignature, Result<PackageDescriptor, RepositoryError>)> + '_,
        RepositoryError,
    > {
        published_entries(self)
    }

    fn fill_entry(
        &self,
        signature: &PackageSignature,
        descriptor: &PackageDescriptor,
        artifacts: &PackagedArtifacts,
    ) -> anyhow::Result<()> {
        let version_dir = self.version_dir(signature);

        self.runtime
            .copy(&artifacts.artifact, &self.artifact_path(signature))
            .with_context(|| format!("Failed to copy {:?}", artifacts.artifact))?;

        if let Some(source_artifact) = &artifacts.source_artifact {
            self.runtime
                .copy(source_artifact, &self.source_artifact_path(signature))
                .with_context(|| format!("Failed to copy {:?}", source_artifact))?;
        }

        // Descriptor goes last: write to a temporary name, then rename into place
        let bytes = self.codec.serialize(descriptor).map_err(|e| anyhow!(e))?;
        let tmp = version_dir.join(format!(".{}.tmp", DESCRIPTOR_FILE));
        self.runtime.write(&tmp, &bytes)?;
        self.runtime.rename(&tmp, &self.descriptor_path(signature))?;
        Ok(())
    }
}

impl<R: Runtime, C: DescriptorCodec> Repository for PackageRepository<'_, R, C> {
    fn exists(&self, signature: &PackageSignature) -> bool {
        self.runtime.is_dir(&self.version_dir(signature))
    }

    #[tracing::instrument(skip(self))]
    fn read_descriptor(
        &self,
        signature: &PackageSignature,
    ) -> Result<PackageDescriptor, RepositoryError> {
        let path = self.descriptor_path(signature);
        if !self.runtime.exists(&path) {
            return Err(RepositoryError::NotFound(signature.clone()));
        }

        let bytes = self
            .runtime
            .read(&path)
            .map_err(|e| RepositoryError::Io {
                path: path.clone(),
                source: e.into(),
            })?;

        let corrupt = |source: BoxError| RepositoryError::Corrupt {
            signature: signature.clone(),
            source,
        };
        let descriptor = self.codec.parse(&bytes).map_err(corrupt)?;
        if &descriptor.signature != signature {
            return Err(corrupt(
                format!("descriptor describes {}", descriptor.signature).into(),
            ));
        }
        descriptor.validate().map_err(|e| corrupt(e.into()))?;
        Ok(descriptor)
    }

    fn locate_artifact(&self, signature: &PackageSignature) -> PathBuf {
        self.artifact_path(signature)
    }

    #[tracing::instrument(skip(self, descriptor))]
    fn write(
        &self,
        signature: &PackageSignature,
        descriptor: &PackageDescriptor,
        artifacts: &PackagedArtifacts,
    ) -> Result<(), RepositoryError> {
        let write_failed = |e: anyhow::Error| RepositoryError::WriteFailed {
            signature: signature.clone(),
            source: e.into(),
        };

        if &descriptor.signature != signature {
            return Err(write_failed(anyhow!(
                "descriptor describes {}, not {}",
                descriptor.signature,
                signature
            )));
        }
        descriptor.validate().map_err(write_failed)?;

        let version_dir = self.version_dir(signature);
        if let Some(versions_dir) = version_dir.parent() {
            self.runtime
                .create_dir_all(versions_dir)
                .map_err(write_failed)?;
        }

        // Claiming the slot is atomic: only one writer can create the directory
        if !self.runtime.create_dir(&version_dir).map_err(write_failed)? {
            return Err(RepositoryError::AlreadyPublished(signature.clone()));
        }
        debug!("Claimed {:?} for {}", version_dir, signature);

        if let Err(e) = self.fill_entry(signature, descriptor, artifacts) {
            warn!("Publishing {} failed, removing {:?}", signature, version_dir);
            if let Err(cleanup) = self.runtime.remove_dir_all(&version_dir) {
                warn!("Failed to remove {:?}: {}", version_dir, cleanup);
            }
            return Err(write_failed(e));
        }

        Ok(())
    }

    fn signatures(&self) -> Result<Vec<PackageSignature>, RepositoryError> {
        find_all_signatures(self.runtime, &self.root).map_err(|e| RepositoryError::Io {
            path: self.root.clone(),
            source: e.into(),
        })
    }
}
