use crate::error::{ReleaseError, Result};
use crate::git::{GitRunner, STAGING_BRANCH};
use crate::prompt::Confirm;

/// Release-aware wrapper over a [GitRunner].
///
/// Tracks the branch that was checked out when the run started and knows how
/// to put the repository back into that state: switch back to the base branch
/// (a no-op when already there) and drop the staging branch.
pub struct GitClient<R: GitRunner> {
    runner: R,
    base_branch: Option<String>,
}

impl<R: GitRunner> GitClient<R> {
    pub fn new(runner: R) -> Self {
        GitClient {
            runner,
            base_branch: None,
        }
    }

    /// Run a single git command, returning captured stdout.
    pub fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        self.runner.run(command, args)
    }

    /// Name of the currently checked-out branch, line breaks trimmed.
    pub fn current_branch(&self) -> Result<String> {
        let output = self.execute("rev-parse", &["--abbrev-ref", "HEAD"])?;
        Ok(output.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Captures the branch active right now as the base branch.
    ///
    /// Must run before any branch-mutating step; [Self::restore_base_branch]
    /// refuses to operate without it.
    pub fn initialize(&mut self) -> Result<()> {
        let branch = self.current_branch()?;
        self.base_branch = Some(branch);
        Ok(())
    }

    pub fn base_branch(&self) -> Option<&str> {
        self.base_branch.as_deref()
    }

    /// Best-effort branch deletion. The branch may not exist, so failures are
    /// expected noise and intentionally discarded.
    pub fn delete_branch(&self, name: &str) {
        let _ = self.execute("branch", &["-D", name]);
    }

    /// Switches back to the base branch and deletes the staging branch.
    ///
    /// Already being on the base branch is a success and issues no checkout.
    /// The staging branch is deleted in either case.
    pub fn restore_base_branch(&self) -> Result<()> {
        let base = self
            .base_branch
            .as_deref()
            .ok_or(ReleaseError::UninitializedBaseBranch)?;

        let current = self
            .current_branch()
            .map_err(|_| ReleaseError::restore("can't get the current branch"))?;

        if current != base {
            self.execute("checkout", &[base]).map_err(|_| {
                ReleaseError::restore(format!(
                    "can't checkout the previous working branch '{}'",
                    base
                ))
            })?;
        }

        self.delete_branch(STAGING_BRANCH);
        Ok(())
    }

    /// Returns whether `version` already exists as a tag on `remote`.
    ///
    /// A failed lookup is treated as "no matching tag": the original listing
    /// command errors out when the remote has no tags at all.
    pub fn tag_exists_on_remote(&self, remote: &str, version: &str) -> Result<bool> {
        let output = match self.execute("ls-remote", &["--tags", remote]) {
            Ok(output) => output,
            Err(_) => return Ok(false),
        };

        let needle = format!("refs/tags/{}", version);
        Ok(output
            .lines()
            .any(|line| line.split_whitespace().any(|field| field == needle)))
    }

    /// Resolves when tagging `version` may proceed.
    ///
    /// An absent tag resolves immediately. A present tag asks the
    /// confirmation gate whether to overwrite; declining is a hard stop.
    pub fn confirm_tag_overwrite(
        &self,
        remote: &str,
        version: &str,
        gate: &dyn Confirm,
    ) -> Result<()> {
        if !self.tag_exists_on_remote(remote, version)? {
            return Ok(());
        }

        let question = format!(
            "The tag {} already exists on {}, overwrite it?",
            version, remote
        );
        if gate.ask(&question, false)? {
            Ok(())
        } else {
            Err(ReleaseError::aborted(
                "process stopped, no tag created or updated",
            ))
        }
    }
}
