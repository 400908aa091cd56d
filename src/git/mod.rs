//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git command line,
//! allowing for multiple implementations including a real subprocess runner
//! and a scripted mock for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [GitRunner] trait: one git command name plus
//! its argument list in, captured stdout out. The concrete implementations
//! include:
//!
//! - [process::ProcessGitRunner]: spawns the real `git` binary
//! - [mock::MockGitRunner]: a scripted implementation for testing
//!
//! On top of the runner sits [GitClient], which owns the release-specific
//! branch bookkeeping: it captures the branch that was active when the run
//! started ("base branch"), recreates and deletes the staging branch, and
//! restores the working environment when the run ends.

pub mod client;
pub mod mock;
pub mod process;

pub use client::GitClient;
pub use mock::MockGitRunner;
pub use process::ProcessGitRunner;

use crate::error::Result;

/// Fixed name of the transient branch the release commit is assembled on.
pub const STAGING_BRANCH: &str = "tmp/release";

/// Executes a single git command and captures its output.
///
/// Implementations map underlying failures (spawn errors, non-zero exits) to
/// [crate::error::ReleaseError::Git] carrying the raw cause, so callers can
/// surface both the failing command and what the tool itself reported.
pub trait GitRunner: Send + Sync {
    /// Run `git <command> <args...>` and return captured stdout.
    fn run(&self, command: &str, args: &[&str]) -> Result<String>;
}

impl<T: GitRunner + ?Sized> GitRunner for &T {
    fn run(&self, command: &str, args: &[&str]) -> Result<String> {
        (**self).run(command, args)
    }
}
