//! Package management module
//!
//! This module provides the package model (signatures and descriptors), the
//! version-addressed repository, transitive dependency resolution and the
//! reverse-dependency scan.

mod codec;
mod dependents;
mod descriptor;
mod discovery;
mod repository;
mod resolver;
mod signature;

pub use codec::{BoxError, DescriptorCodec, JsonCodec};
pub use dependents::{DependentScan, find_dependents};
pub use descriptor::{DESCRIPTOR_FILE, PackageDescriptor};
pub use discovery::find_all_signatures;
#[cfg(test)]
pub use repository::MockRepository;
pub use repository::{PackageRepository, PackagedArtifacts, Repository, published_entries};
pub use resolver::{ClasspathEntry, DependencyResolver, ResolvedClasspath};
pub use signature::{PackageIdentity, PackageSignature, PackageVersion};
