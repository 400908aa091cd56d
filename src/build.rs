//! Build-tool runner.
//!
//! The build stage is optional infrastructure, not a release gate: when the
//! project carries no build configuration the orchestrator skips the stage
//! entirely. When it does run, the tool is executed in the project directory
//! and any diagnostic output is treated as a failure.

use std::path::PathBuf;
use std::process::Command;

use crate::config::BuildConfig;
use crate::error::{ReleaseError, Result};

/// Executes a named or default build task in the project directory.
pub trait BuildRunner: Send + Sync {
    /// Whether a build-configuration file is present in the project root.
    fn has_build_configuration(&self) -> bool;

    /// Run the default task (`None`) or a named task.
    fn run(&self, task: Option<&str>) -> Result<()>;
}

/// Runs the configured build program as a subprocess.
pub struct CommandBuildRunner {
    program: String,
    config_file: PathBuf,
    work_dir: PathBuf,
}

impl CommandBuildRunner {
    pub fn new(work_dir: impl Into<PathBuf>, config: &BuildConfig) -> Self {
        let work_dir = work_dir.into();
        CommandBuildRunner {
            program: config.command.clone(),
            config_file: work_dir.join(&config.config_file),
            work_dir,
        }
    }
}

impl BuildRunner for CommandBuildRunner {
    fn has_build_configuration(&self) -> bool {
        self.config_file.is_file()
    }

    fn run(&self, task: Option<&str>) -> Result<()> {
        let mut command_line = self.program.clone();
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.work_dir);
        if let Some(task) = task {
            cmd.arg(task);
            command_line = format!("{} {}", command_line, task);
        }

        let output = cmd.output().map_err(|e| {
            ReleaseError::build(format!("failed to run '{}': {}", command_line, e))
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        // The original rejects on any diagnostic output, not only on a
        // non-zero exit
        if !output.status.success() || !stderr.trim().is_empty() {
            return Err(ReleaseError::build(format!(
                "'{}' command failed: {}",
                command_line,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(command: &str, config_file: &str) -> BuildConfig {
        BuildConfig {
            command: command.to_string(),
            config_file: config_file.to_string(),
            tasks: vec![],
        }
    }

    #[test]
    fn test_missing_configuration_detected() {
        let dir = TempDir::new().unwrap();
        let runner = CommandBuildRunner::new(dir.path(), &config("grunt", "Gruntfile.js"));
        assert!(!runner.has_build_configuration());
    }

    #[test]
    fn test_present_configuration_detected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Gruntfile.js"), "module.exports = {};").unwrap();

        let runner = CommandBuildRunner::new(dir.path(), &config("grunt", "Gruntfile.js"));
        assert!(runner.has_build_configuration());
    }

    #[test]
    fn test_missing_program_is_a_build_error() {
        let dir = TempDir::new().unwrap();
        let runner = CommandBuildRunner::new(
            dir.path(),
            &config("definitely-not-a-real-build-tool", "Makefile"),
        );

        let err = runner.run(None).unwrap_err();
        assert!(err.to_string().starts_with("Build task failed"));
    }

    #[test]
    fn test_successful_quiet_command_passes() {
        let dir = TempDir::new().unwrap();
        let runner = CommandBuildRunner::new(dir.path(), &config("true", "Makefile"));
        runner.run(None).unwrap();
    }

    #[test]
    fn test_failing_command_is_a_build_error() {
        let dir = TempDir::new().unwrap();
        let runner = CommandBuildRunner::new(dir.path(), &config("false", "Makefile"));
        let err = runner.run(None).unwrap_err();
        assert!(err.to_string().contains("command failed"));
    }

    #[test]
    fn test_stderr_output_fails_even_with_zero_exit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let script = dir.path().join("noisy-build");
        fs::write(&script, "#!/bin/sh\necho 'deprecation warning' >&2\nexit 0\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let runner = CommandBuildRunner::new(
            dir.path(),
            &config(script.to_str().unwrap(), "Makefile"),
        );

        let err = runner.run(None).unwrap_err();
        assert!(err.to_string().contains("deprecation warning"));
    }
}
