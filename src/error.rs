//! Error types for repository access, dependency resolution and publishing.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::package::{BoxError, PackageSignature};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0} is not published in the repository")]
    NotFound(PackageSignature),

    #[error("The stored descriptor of {signature} is invalid")]
    Corrupt {
        signature: PackageSignature,
        #[source]
        source: BoxError,
    },

    #[error("{0} is already published")]
    AlreadyPublished(PackageSignature),

    #[error("Failed to write {signature} to the repository")]
    WriteFailed {
        signature: PackageSignature,
        #[source]
        source: BoxError,
    },

    #[error("Failed to read repository directory {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Dependency {dependency} of {required_by} is not published in the repository")]
    MissingDependency {
        dependency: PackageSignature,
        required_by: PackageSignature,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Stages of a publish run, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    Packaging,
    CheckingConflict,
    ResolvingDependencies,
    WritingRepository,
    GeneratingLauncher,
    ScanningDependents,
    Done,
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishStage::Packaging => "packaging",
            PublishStage::CheckingConflict => "checking for conflicts",
            PublishStage::ResolvingDependencies => "resolving dependencies",
            PublishStage::WritingRepository => "writing to the repository",
            PublishStage::GeneratingLauncher => "generating the launcher",
            PublishStage::ScanningDependents => "scanning dependents",
            PublishStage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Packaging {signature} failed: {message}")]
    PackagingFailed {
        signature: PackageSignature,
        message: String,
    },

    #[error(
        "This package ({0}) can't be published because a package with that signature already exists."
    )]
    AlreadyPublished(PackageSignature),

    #[error("Dependency {dependency} of {required_by} is not published in the repository")]
    MissingDependency {
        dependency: PackageSignature,
        required_by: PackageSignature,
    },

    #[error("Failed to read a dependency descriptor while resolving {signature}")]
    DescriptorUnreadable {
        signature: PackageSignature,
        #[source]
        source: RepositoryError,
    },

    #[error("Failed to publish {signature}")]
    RepositoryWriteFailed {
        signature: PackageSignature,
        #[source]
        source: RepositoryError,
    },

    #[error("Published, but failed to write the launcher '{name}'")]
    LauncherWriteFailed {
        name: String,
        #[source]
        source: BoxError,
    },
}

impl PublishError {
    /// The stage the run was in when it failed.
    pub fn stage(&self) -> PublishStage {
        match self {
            PublishError::PackagingFailed { .. } => PublishStage::Packaging,
            PublishError::AlreadyPublished(_) => PublishStage::CheckingConflict,
            PublishError::MissingDependency { .. } | PublishError::DescriptorUnreadable { .. } => {
                PublishStage::ResolvingDependencies
            }
            PublishError::RepositoryWriteFailed { .. } => PublishStage::WritingRepository,
            PublishError::LauncherWriteFailed { .. } => PublishStage::GeneratingLauncher,
        }
    }

    /// Whether the package made it into the repository before the failure.
    pub fn is_published(&self) -> bool {
        matches!(self, PublishError::LauncherWriteFailed { .. })
    }

    pub(crate) fn from_resolve(signature: &PackageSignature, err: ResolveError) -> Self {
        match err {
            ResolveError::MissingDependency {
                dependency,
                required_by,
            } => PublishError::MissingDependency {
                dependency,
                required_by,
            },
            ResolveError::Repository(source) => PublishError::DescriptorUnreadable {
                signature: signature.clone(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_published_message() {
        let err = PublishError::AlreadyPublished(PackageSignature::new("me", "my-project", "1"));
        assert_eq!(
            err.to_string(),
            "This package (me/my-project@1) can't be published because a package with that signature already exists."
        );
        assert_eq!(err.stage(), PublishStage::CheckingConflict);
        assert!(!err.is_published());
    }

    #[test]
    fn test_from_resolve_missing_dependency() {
        let root = PackageSignature::new("me", "a", "1");
        let err = PublishError::from_resolve(
            &root,
            ResolveError::MissingDependency {
                dependency: PackageSignature::new("me", "b", "5"),
                required_by: root.clone(),
            },
        );

        assert_eq!(err.stage(), PublishStage::ResolvingDependencies);
        assert_eq!(
            err.to_string(),
            "Dependency me/b@5 of me/a@1 is not published in the repository"
        );
    }

    #[test]
    fn test_from_resolve_corrupt_descriptor_keeps_source() {
        let root = PackageSignature::new("me", "a", "1");
        let err = PublishError::from_resolve(
            &root,
            ResolveError::Repository(RepositoryError::Corrupt {
                signature: PackageSignature::new("me", "b", "5"),
                source: "bad json".into(),
            }),
        );

        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(
            source.to_string(),
            "The stored descriptor of me/b@5 is invalid"
        );
    }

    #[test]
    fn test_launcher_failure_counts_as_published() {
        let err = PublishError::LauncherWriteFailed {
            name: "foo".to_string(),
            source: anyhow::anyhow!("disk full").into(),
        };
        assert!(err.is_published());
        assert_eq!(err.stage(), PublishStage::GeneratingLauncher);
    }
}
