use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{CommandError, ReleaseError, Result};
use crate::git::GitRunner;

/// Runs git commands as subprocesses in a fixed working directory.
pub struct ProcessGitRunner {
    work_dir: PathBuf,
}

impl ProcessGitRunner {
    /// Creates a runner operating on the repository at `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        ProcessGitRunner {
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

impl GitRunner for ProcessGitRunner {
    fn run(&self, command: &str, args: &[&str]) -> Result<String> {
        let rendered = render(command, args);

        let output = Command::new("git")
            .arg(command)
            .args(args)
            .current_dir(&self.work_dir)
            .output()
            .map_err(|e| ReleaseError::Git {
                command: rendered.clone(),
                source: CommandError::Spawn(e),
            })?;

        if !output.status.success() {
            return Err(ReleaseError::Git {
                command: rendered,
                source: CommandError::Exit {
                    code: output.status.code().unwrap_or(-1),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn render(command: &str, args: &[&str]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}
