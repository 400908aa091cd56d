use thiserror::Error;

/// Failure of a single spawned command (git, build tool).
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to spawn: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("exited with code {code}: {stderr}")]
    Exit { code: i32, stderr: String },
}

/// Unified error type for git-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Git command failed: git {command}")]
    Git {
        command: String,
        #[source]
        source: CommandError,
    },

    #[error("No base branch is defined, the release was never initialized")]
    UninitializedBaseBranch,

    #[error("Version error: {0}")]
    Version(String),

    #[error("Build task failed: {0}")]
    Build(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Release aborted: {0}")]
    Aborted(String),

    #[error("{label}")]
    Step {
        label: String,
        #[source]
        source: Box<ReleaseError>,
    },

    #[error("Restore failed: {0}")]
    Restore(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    /// Create a build error with context
    pub fn build(msg: impl Into<String>) -> Self {
        ReleaseError::Build(msg.into())
    }

    /// Create a notification error with context
    pub fn notification(msg: impl Into<String>) -> Self {
        ReleaseError::Notification(msg.into())
    }

    /// Create a policy abort (user declined a confirmation)
    pub fn aborted(msg: impl Into<String>) -> Self {
        ReleaseError::Aborted(msg.into())
    }

    /// Create a restore error with context
    pub fn restore(msg: impl Into<String>) -> Self {
        ReleaseError::Restore(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Wrap an underlying failure with a stage-identifying label
    pub fn step(label: impl Into<String>, source: ReleaseError) -> Self {
        ReleaseError::Step {
            label: label.into(),
            source: Box::new(source),
        }
    }

    /// True for failures caused by a declined confirmation prompt
    pub fn is_policy_abort(&self) -> bool {
        match self {
            ReleaseError::Aborted(_) => true,
            ReleaseError::Step { source, .. } => source.is_policy_abort(),
            _ => false,
        }
    }
}
