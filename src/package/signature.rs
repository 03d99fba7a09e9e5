//! Package identity, version and signature.

use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identity of a package lineage.
/// Format: "publisher/project"
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageIdentity {
    pub publisher: String,
    pub project: String,
}

impl PackageIdentity {
    pub fn new(publisher: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            publisher: publisher.into(),
            project: project.into(),
        }
    }

    pub fn at(&self, version: impl Into<PackageVersion>) -> PackageSignature {
        PackageSignature {
            identity: self.clone(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.publisher, self.project)
    }
}

impl FromStr for PackageIdentity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            anyhow::bail!("Invalid package format '{}'. Expected 'publisher/project'.", s)
        }
        Ok(PackageIdentity::new(parts[0], parts[1]))
    }
}

/// Opaque version token. Only compared for equality (and ordered for stable output).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PackageVersion(String);

impl PackageVersion {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PackageVersion {
    fn from(s: &str) -> Self {
        PackageVersion(s.to_string())
    }
}

impl From<String> for PackageVersion {
    fn from(s: String) -> Self {
        PackageVersion(s)
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Uniquely addresses one published artifact set.
/// Format: "publisher/project@version"
///
/// Ordering is by identity, then version.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageSignature {
    #[serde(flatten)]
    pub identity: PackageIdentity,
    pub version: PackageVersion,
}

impl PackageSignature {
    pub fn new(
        publisher: impl Into<String>,
        project: impl Into<String>,
        version: impl Into<PackageVersion>,
    ) -> Self {
        PackageIdentity::new(publisher, project).at(version)
    }

    pub fn publisher(&self) -> &str {
        &self.identity.publisher
    }

    pub fn project(&self) -> &str {
        &self.identity.project
    }
}

/// Check that `value` can stand as a single file or directory name inside the
/// repository.
pub fn check_path_component(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        bail!("The {} cannot be empty", field);
    }
    if value == "." || value == ".." || value.contains(['/', '\\', '\0']) {
        bail!(
            "The {} '{}' must be a single name, not a path",
            field,
            value.escape_default()
        );
    }
    Ok(())
}

impl PackageSignature {
    /// Reject signatures that cannot be stored as
    /// `<publisher>/<project>/versions/<version>`.
    ///
    /// Hidden names are rejected as well, since repository discovery skips them.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("publisher", self.publisher()),
            ("project", self.project()),
            ("version", self.version.as_str()),
        ] {
            check_path_component(field, value)?;
            if value.starts_with('.') {
                bail!("The {} '{}' cannot start with '.'", field, value);
            }
        }
        Ok(())
    }
}

impl fmt::Display for PackageSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.identity, self.version)
    }
}

impl FromStr for PackageSignature {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (identity, version) = s.rsplit_once('@').ok_or_else(|| {
            anyhow!(
                "Invalid signature '{}'. Expected 'publisher/project@version'.",
                s
            )
        })?;
        if version.is_empty() {
            return Err(anyhow!(
                "Invalid format: version after @ cannot be empty. Expected 'publisher/project@version'."
            ));
        }
        let signature = identity.parse::<PackageIdentity>()?.at(version);
        signature.validate()?;
        Ok(signature)
    }
}
