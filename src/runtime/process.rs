//! Running external commands.

use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;
use std::process::Command;

use super::RealRuntime;

/// A command line to run, with its working directory and extra environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub envs: Vec<(String, String)>,
}

impl CommandSpec {
    /// A shell command line, run through `sh -c` (`cmd /C` on Windows).
    pub fn shell(command_line: &str, working_dir: PathBuf) -> Self {
        #[cfg(windows)]
        let (program, flag) = ("cmd", "/C");
        #[cfg(not(windows))]
        let (program, flag) = ("sh", "-c");

        Self {
            program: program.to_string(),
            args: vec![flag.to_string(), command_line.to_string()],
            working_dir,
            envs: Vec::new(),
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.envs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn run_command_impl(&self, command: &CommandSpec) -> Result<Option<i32>> {
        debug!(
            "Running {} {:?} in {:?}",
            command.program, command.args, command.working_dir
        );
        let status = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.working_dir)
            .envs(command.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .status()
            .with_context(|| format!("Failed to start '{}'", command.program))?;
        debug!("{} exited with {:?}", command.program, status.code());
        Ok(status.code())
    }
}
