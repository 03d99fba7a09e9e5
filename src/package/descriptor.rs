use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use super::signature::check_path_component;
use super::{PackageIdentity, PackageSignature};
use crate::launcher::SHELL_LAUNCHER_DIR;
use crate::runtime::Runtime;

/// Name of the descriptor file, both in a project folder and in a repository entry.
pub const DESCRIPTOR_FILE: &str = "shelf.json";

fn is_false(value: &bool) -> bool {
    !*value
}

/// Publisher directories share the repository root with launchers: the shell
/// launcher directory and `<name>.cmd` batch files.
fn is_reserved_publisher(publisher: &str) -> bool {
    publisher.eq_ignore_ascii_case(SHELL_LAUNCHER_DIR)
        || publisher.to_ascii_lowercase().ends_with(".cmd")
}

/// Package metadata, read from a project folder or from the repository
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    #[serde(flatten)]
    pub signature: PackageSignature,
    /// Fully-qualified runnable unit launched by the generated shortcut
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    /// Launcher name override (defaults to the project name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut_name: Option<String>,
    /// Pass the resolved classpath to the entry point as an argument
    #[serde(default, skip_serializing_if = "is_false")]
    pub capture_runtime_arguments: bool,
    /// Exact pinned dependencies, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<PackageSignature>,
}

impl PackageDescriptor {
    pub fn new(signature: PackageSignature) -> Self {
        Self {
            signature,
            entry_point: None,
            shortcut_name: None,
            capture_runtime_arguments: false,
            dependencies: Vec::new(),
        }
    }

    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = Some(entry_point.into());
        self
    }

    pub fn with_shortcut_name(mut self, name: impl Into<String>) -> Self {
        self.shortcut_name = Some(name.into());
        self
    }

    pub fn with_captured_runtime_arguments(mut self) -> Self {
        self.capture_runtime_arguments = true;
        self
    }

    pub fn with_dependency(mut self, dependency: PackageSignature) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn identity(&self) -> &PackageIdentity {
        &self.signature.identity
    }

    pub fn project(&self) -> &str {
        self.signature.project()
    }

    /// Name of the generated launcher: the shortcut name if set, else the project.
    pub fn launcher_name(&self) -> &str {
        self.shortcut_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.project())
    }

    /// Reject descriptors whose names cannot be stored in the repository or
    /// that declare a dependency identity more than once.
    pub fn validate(&self) -> Result<()> {
        let sig = &self.signature;
        sig.validate()
            .with_context(|| format!("Invalid package signature '{}'", sig))?;
        if is_reserved_publisher(sig.publisher()) {
            bail!(
                "The publisher name '{}' is reserved for launchers",
                sig.publisher()
            );
        }
        if let Some(name) = self.shortcut_name.as_deref().filter(|n| !n.is_empty()) {
            check_path_component("shortcut name", name)?;
        }

        let mut seen = HashSet::new();
        for dependency in &self.dependencies {
            dependency
                .validate()
                .with_context(|| format!("Invalid dependency '{}' of {}", dependency, sig))?;
            if !seen.insert(&dependency.identity) {
                bail!(
                    "{} declares more than one dependency on {}",
                    sig,
                    dependency.identity
                );
            }
        }
        Ok(())
    }

    /// Load and validate a project's descriptor file.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let descriptor: PackageDescriptor = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        descriptor.validate()?;
        Ok(descriptor)
    }
}
