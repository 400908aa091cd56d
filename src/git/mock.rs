use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::error::{CommandError, ReleaseError, Result};
use crate::git::GitRunner;

/// Mock git runner for testing without a real repository.
///
/// Commands succeed with empty output unless a response has been scripted for
/// them. Scripted responses are consumed in order, one per invocation. Every
/// invocation is recorded so tests can assert which commands ran and, just as
/// important, which never did.
#[derive(Default)]
pub struct MockGitRunner {
    responses: Mutex<HashMap<String, VecDeque<std::result::Result<String, String>>>>,
    calls: Mutex<Vec<String>>,
}

impl MockGitRunner {
    /// Create a new mock where every command succeeds with empty output
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful response for the next invocation of `command`
    pub fn stub_ok(&self, command: &str, stdout: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .entry(command.to_string())
            .or_default()
            .push_back(Ok(stdout.into()));
    }

    /// Script a failure for the next invocation of `command`
    pub fn stub_err(&self, command: &str, stderr: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .entry(command.to_string())
            .or_default()
            .push_back(Err(stderr.into()));
    }

    /// Full command lines recorded so far, in invocation order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded invocations whose command line starts with `prefix`
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

impl GitRunner for MockGitRunner {
    fn run(&self, command: &str, args: &[&str]) -> Result<String> {
        let rendered = if args.is_empty() {
            command.to_string()
        } else {
            format!("{} {}", command, args.join(" "))
        };
        self.calls.lock().unwrap().push(rendered.clone());

        let scripted = self
            .responses
            .lock()
            .unwrap()
            .get_mut(command)
            .and_then(|queue| queue.pop_front());

        match scripted {
            Some(Ok(stdout)) => Ok(stdout),
            Some(Err(stderr)) => Err(ReleaseError::Git {
                command: rendered,
                source: CommandError::Exit { code: 1, stderr },
            }),
            None => Ok(String::new()),
        }
    }
}
