//! Building a project folder into publishable artifacts.

use anyhow::Result;
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::package::{PackageDescriptor, PackagedArtifacts};
use crate::runtime::{CommandSpec, Runtime};

/// Directory inside a project folder holding the built artifacts.
pub const OUTPUT_DIR: &str = "outputs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    pub project_folder: PathBuf,
    pub descriptor: PackageDescriptor,
    /// Compile classpath: the resolved dependency artifacts, in order.
    pub classpath: Vec<PathBuf>,
}

impl PackageRequest {
    /// Returns: `<project_folder>/outputs`
    pub fn output_dir(&self) -> PathBuf {
        self.project_folder.join(OUTPUT_DIR)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOutcome {
    Success(PackagedArtifacts),
    /// Build or test failure, reported to the user verbatim.
    Failure { message: String },
}

#[cfg_attr(test, mockall::automock)]
pub trait Packager: Send + Sync {
    fn package(&self, request: &PackageRequest) -> Result<PackageOutcome>;
}

/// Runs an optional shell command in the project folder, then collects
/// `outputs/<project>.jar` and, when present, `outputs/<project>.sources.jar`.
pub struct CommandPackager<'a, R: Runtime> {
    runtime: &'a R,
    command: Option<String>,
}

impl<'a, R: Runtime> CommandPackager<'a, R> {
    pub fn new(runtime: &'a R, command: Option<String>) -> Self {
        Self { runtime, command }
    }

    fn command_spec(&self, command_line: &str, request: &PackageRequest) -> CommandSpec {
        let separator = if cfg!(windows) { ";" } else { ":" };
        let classpath = request
            .classpath
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(separator);
        let signature = &request.descriptor.signature;

        CommandSpec::shell(command_line, request.project_folder.clone())
            .env("SHELF_CLASSPATH", classpath)
            .env("SHELF_OUTPUT_DIR", request.output_dir().display().to_string())
            .env("SHELF_PROJECT", signature.project())
            .env("SHELF_PUBLISHER", signature.publisher())
            .env("SHELF_VERSION", signature.version.as_str())
    }

    fn collect(&self, output_dir: &Path, project: &str) -> PackageOutcome {
        let artifact = output_dir.join(format!("{}.jar", project));
        if !self.runtime.exists(&artifact) {
            return PackageOutcome::Failure {
                message: format!("Build output {} was not found", artifact.display()),
            };
        }

        let source_artifact = output_dir.join(format!("{}.sources.jar", project));
        let source_artifact = self.runtime.exists(&source_artifact).then_some(source_artifact);
        if source_artifact.is_none() {
            debug!("No source artifact in {:?}", output_dir);
        }

        PackageOutcome::Success(PackagedArtifacts {
            artifact,
            source_artifact,
        })
    }
}

impl<R: Runtime> Packager for CommandPackager<'_, R> {
    #[tracing::instrument(skip(self, request), fields(package = %request.descriptor.signature))]
    fn package(&self, request: &PackageRequest) -> Result<PackageOutcome> {
        let output_dir = request.output_dir();

        if let Some(command_line) = &self.command {
            self.runtime.create_dir_all(&output_dir)?;
            info!("Running packager: {}", command_line);

            let code = self
                .runtime
                .run_command(&self.command_spec(command_line, request))?;
            if code != Some(0) {
                let status = match code {
                    Some(code) => format!("exit code {}", code),
                    None => "a signal".to_string(),
                };
                return Ok(PackageOutcome::Failure {
                    message: format!("Packager command '{}' failed with {}", command_line, status),
                });
            }
        } else {
            debug!("No packager command, using prebuilt outputs in {:?}", output_dir);
        }

        Ok(self.collect(&output_dir, request.descriptor.project()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageSignature;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use tempfile::tempdir;

    fn request(folder: &Path) -> PackageRequest {
        PackageRequest {
            project_folder: folder.to_path_buf(),
            descriptor: PackageDescriptor::new(PackageSignature::new("me", "a", "1")),
            classpath: vec![
                PathBuf::from("/repo/me/b/versions/5/b.jar"),
                PathBuf::from("/repo/me/c/versions/7/c.jar"),
            ],
        }
    }

    #[test]
    fn test_prebuilt_outputs_without_sources() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .with(eq(PathBuf::from("/work/a/outputs/a.jar")))
            .returning(|_| true);
        runtime
            .expect_exists()
            .with(eq(PathBuf::from("/work/a/outputs/a.sources.jar")))
            .returning(|_| false);
        runtime.expect_run_command().never();

        let packager = CommandPackager::new(&runtime, None);
        let outcome = packager.package(&request(Path::new("/work/a"))).unwrap();

        assert_eq!(
            outcome,
            PackageOutcome::Success(PackagedArtifacts {
                artifact: PathBuf::from("/work/a/outputs/a.jar"),
                source_artifact: None,
            })
        );
    }

    #[test]
    fn test_missing_artifact_is_a_failure() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);

        let packager = CommandPackager::new(&runtime, None);
        let outcome = packager.package(&request(Path::new("/work/a"))).unwrap();

        assert!(matches!(
            outcome,
            PackageOutcome::Failure { message } if message.contains("a.jar was not found")
        ));
    }

    #[test]
    fn test_command_receives_build_environment() {
        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir_all().returning(|_| Ok(()));
        runtime
            .expect_run_command()
            .withf(|spec| {
                spec.working_dir == Path::new("/work/a")
                    && spec.args.last().map(String::as_str) == Some("make jar")
                    && spec.env_value("SHELF_PROJECT") == Some("a")
                    && spec.env_value("SHELF_PUBLISHER") == Some("me")
                    && spec.env_value("SHELF_VERSION") == Some("1")
                    && spec.env_value("SHELF_OUTPUT_DIR")
                        == Some(Path::new("/work/a").join("outputs").display().to_string().as_str())
                    && spec
                        .env_value("SHELF_CLASSPATH")
                        .is_some_and(|cp| cp.contains("b.jar") && cp.contains("c.jar"))
            })
            .times(1)
            .returning(|_| Ok(Some(0)));
        runtime.expect_exists().returning(|_| true);

        let packager = CommandPackager::new(&runtime, Some("make jar".to_string()));
        let outcome = packager.package(&request(Path::new("/work/a"))).unwrap();

        assert!(matches!(
            outcome,
            PackageOutcome::Success(PackagedArtifacts { source_artifact: Some(_), .. })
        ));
    }

    #[test]
    fn test_command_failure_is_reported() {
        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir_all().returning(|_| Ok(()));
        runtime.expect_run_command().returning(|_| Ok(Some(2)));
        runtime.expect_exists().never();

        let packager = CommandPackager::new(&runtime, Some("make jar".to_string()));
        let outcome = packager.package(&request(Path::new("/work/a"))).unwrap();

        assert_eq!(
            outcome,
            PackageOutcome::Failure {
                message: "Packager command 'make jar' failed with exit code 2".to_string()
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_real_command_builds_outputs() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let packager = CommandPackager::new(
            &runtime,
            Some("echo \"$SHELF_PUBLISHER\" > \"$SHELF_OUTPUT_DIR/$SHELF_PROJECT.jar\"".to_string()),
        );

        let outcome = packager.package(&request(dir.path())).unwrap();

        let PackageOutcome::Success(artifacts) = outcome else {
            panic!("packaging failed: {outcome:?}");
        };
        assert_eq!(artifacts.artifact, dir.path().join("outputs/a.jar"));
        assert_eq!(std::fs::read_to_string(&artifacts.artifact).unwrap(), "me\n");
    }
}
