//! Error types for autodeployer

use crate::version::ChangeClass;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while promoting a release
#[derive(Debug, Error)]
pub enum Error {
    /// Version string is not `MAJOR.MINOR.PATCH[-rcN]`
    #[error("invalid tag format: {0}")]
    InvalidTagFormat(String),

    /// Requested change class has no resolution rule
    #[error("{0} version changes are not implemented")]
    Unimplemented(ChangeClass),

    /// No baseline version could be resolved
    #[error("no tag found: {0}")]
    NoTagFound(String),

    /// Manifest changed between read and write
    #[error("{path} on branch {branch} was modified concurrently; re-run the bump")]
    ConcurrentModification {
        /// Manifest path in the deployment repository
        path: String,
        /// Branch the write targeted
        branch: String,
    },

    /// Manifest references neither the old nor the new tag
    #[error("{path} on branch {branch} references neither {old_tag} nor {new_tag}; nothing was bumped")]
    ManifestMismatch {
        /// Manifest path in the deployment repository
        path: String,
        /// Branch that was read
        branch: String,
        /// Tag expected in the manifest
        old_tag: String,
        /// Tag the manifest should end up with
        new_tag: String,
    },

    /// Transport, auth or permission failure from GitHub
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Workflow did not finish within the polling budget
    #[error(
        "workflow on {target} did not complete after {attempts} checks; it may still finish, check it manually"
    )]
    TimedOut {
        /// Human-readable description of what was polled
        target: String,
        /// Number of polls performed
        attempts: u32,
    },

    /// Workflow completed with a non-success conclusion (strict mode only)
    #[error("workflow run {run_id} completed with conclusion '{conclusion}'")]
    WorkflowFailed {
        /// Run identifier
        run_id: u64,
        /// Conclusion reported by GitHub
        conclusion: String,
    },

    /// Missing or invalid credentials
    #[error("authentication error: {0}")]
    Auth(String),

    /// Configuration file problems
    #[error("configuration error: {0}")]
    Config(String),

    /// Unparseable input such as a repository spec
    #[error("parse error: {0}")]
    Parse(String),

    /// Interrupted by the user or an overall deadline
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Filesystem errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML decoding errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// Invariant violations inside the crate
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether re-running the same operation later may succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrentModification { .. } | Self::GitHubApi(_) | Self::TimedOut { .. }
        )
    }
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => Self::GitHubApi(format!(
                "{} ({})",
                source.message,
                source.status_code.as_u16()
            )),
            other => Self::GitHubApi(other.to_string()),
        }
    }
}
