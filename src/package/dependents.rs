//! Reverse-dependency scan run after a publish.
//!
//! Finds published packages pinned to another version of the package that was
//! just published, so the user can republish them.

use log::warn;

use crate::error::RepositoryError;

use super::{PackageSignature, Repository, published_entries};

/// Result of scanning the repository for reverse dependencies.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DependentScan {
    /// Published packages pinned to another version of the scanned package,
    /// sorted and deduplicated.
    pub dependents: Vec<PackageSignature>,
    /// Entries whose descriptor could not be read, with the reason.
    pub unreadable: Vec<(PackageSignature, String)>,
}

/// Find published packages that depend on a different version of
/// `published`'s identity.
#[tracing::instrument(skip(repository))]
pub fn find_dependents<P: Repository + ?Sized>(
    repository: &P,
    published: &PackageSignature,
) -> Result<DependentScan, RepositoryError> {
    let mut scan = DependentScan::default();

    for (signature, descriptor) in published_entries(repository)? {
        let descriptor = match descriptor {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!("Skipping {} while scanning dependents: {}", signature, e);
                scan.unreadable.push((signature, e.to_string()));
                continue;
            }
        };

        let stale = descriptor.dependencies.iter().any(|dependency| {
            dependency.identity == published.identity && dependency.version != published.version
        });
        if stale {
            scan.dependents.push(signature);
        }
    }

    scan.dependents.sort();
    scan.dependents.dedup();
    Ok(scan)
}
