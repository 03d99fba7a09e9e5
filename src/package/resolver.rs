//! Transitive dependency resolution over published descriptors.

use log::debug;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{RepositoryError, ResolveError};

use super::{PackageDescriptor, PackageIdentity, PackageSignature, Repository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClasspathEntry {
    /// The root package's own build output.
    Root { location: PathBuf },
    /// A published dependency's primary artifact.
    Dependency {
        signature: PackageSignature,
        location: PathBuf,
    },
}

impl ClasspathEntry {
    pub fn location(&self) -> &Path {
        match self {
            ClasspathEntry::Root { location } | ClasspathEntry::Dependency { location, .. } => {
                location
            }
        }
    }

    pub fn signature(&self) -> Option<&PackageSignature> {
        match self {
            ClasspathEntry::Root { .. } => None,
            ClasspathEntry::Dependency { signature, .. } => Some(signature),
        }
    }
}

/// Ordered, identity-deduplicated closure of a package and its dependencies.
/// The root entry is always first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedClasspath {
    entries: Vec<ClasspathEntry>,
}

impl ResolvedClasspath {
    fn new(root_output: &Path) -> Self {
        Self {
            entries: vec![ClasspathEntry::Root {
                location: root_output.to_path_buf(),
            }],
        }
    }

    pub fn entries(&self) -> &[ClasspathEntry] {
        &self.entries
    }

    pub fn locations(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(ClasspathEntry::location)
    }

    /// Every location except the root, i.e. the compile classpath.
    pub fn dependency_locations(&self) -> impl Iterator<Item = &Path> {
        self.locations().skip(1)
    }

    pub fn signatures(&self) -> impl Iterator<Item = &PackageSignature> {
        self.entries.iter().filter_map(ClasspathEntry::signature)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct DependencyResolver<'a, P: Repository> {
    repository: &'a P,
}

impl<'a, P: Repository> DependencyResolver<'a, P> {
    pub fn new(repository: &'a P) -> Self {
        Self { repository }
    }

    /// Depth-first, pre-order walk of the declared dependencies. The first
    /// version seen of an identity wins; later ones (and cycles) are skipped.
    #[tracing::instrument(skip(self, root), fields(package = %root.signature))]
    pub fn resolve(
        &self,
        root: &PackageDescriptor,
        root_output: &Path,
    ) -> Result<ResolvedClasspath, ResolveError> {
        let mut classpath = ResolvedClasspath::new(root_output);
        let mut seen: HashSet<PackageIdentity> = HashSet::new();
        seen.insert(root.identity().clone());

        self.visit(root, &mut seen, &mut classpath)?;
        Ok(classpath)
    }

    fn visit(
        &self,
        descriptor: &PackageDescriptor,
        seen: &mut HashSet<PackageIdentity>,
        classpath: &mut ResolvedClasspath,
    ) -> Result<(), ResolveError> {
        for dependency in &descriptor.dependencies {
            if !seen.insert(dependency.identity.clone()) {
                debug!(
                    "Skipping {} required by {}: identity already resolved",
                    dependency, descriptor.signature
                );
                continue;
            }

            classpath.entries.push(ClasspathEntry::Dependency {
                signature: dependency.clone(),
                location: self.repository.locate_artifact(dependency),
            });

            let child = match self.repository.read_descriptor(dependency) {
                Ok(child) => child,
                Err(RepositoryError::NotFound(_)) => {
                    return Err(ResolveError::MissingDependency {
                        dependency: dependency.clone(),
                        required_by: descriptor.signature.clone(),
                    });
                }
                Err(e) => return Err(e.into()),
            };

            self.visit(&child, seen, classpath)?;
        }
        Ok(())
    }
}
