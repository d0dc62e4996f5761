//! Core types for autodeployer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A repository on the hosting platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoRef {
    /// Create a repository reference
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A git tag and the commit it points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoTag {
    /// Tag name
    pub name: String,
    /// Commit SHA the tag points at
    pub commit_sha: String,
}

/// A release as listed by the hosting platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Tag the release was cut from
    pub tag_name: String,
    /// Marked as pre-release
    pub prerelease: bool,
    /// Still a draft
    pub draft: bool,
}

impl ReleaseInfo {
    /// A published, non-prerelease release
    pub const fn is_official(&self) -> bool {
        !self.prerelease && !self.draft
    }
}

/// Release to be created on the source repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    /// Tag to create
    pub tag: String,
    /// Branch the tag is cut from
    pub target_branch: String,
    /// Release title
    pub title: String,
    /// Release body
    pub body: String,
    /// Whether the release is a pre-release
    pub is_prerelease: bool,
}

/// A release after the platform accepted it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedRelease {
    /// Release ID
    pub id: u64,
    /// Tag name
    pub tag_name: String,
    /// Web URL of the release
    pub html_url: String,
}

/// Decoded file content and its blob SHA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// Path within the repository
    pub path: String,
    /// UTF-8 content
    pub content: String,
    /// Blob SHA used as the write precondition
    pub sha: String,
}

/// Status of a workflow run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowStatus {
    /// Waiting to be picked up
    Queued,
    /// Running
    InProgress,
    /// No longer running (says nothing about success)
    Completed,
    /// Any other status string reported by the platform
    Unknown(String),
}

impl WorkflowStatus {
    /// Map the platform's status string; only `"completed"` is terminal
    pub fn from_api(status: &str) -> Self {
        match status {
            "queued" => Self::Queued,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether the run has stopped
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => f.write_str("queued"),
            Self::InProgress => f.write_str("in_progress"),
            Self::Completed => f.write_str("completed"),
            Self::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// Snapshot of a workflow run taken during one poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    /// Run ID
    pub id: u64,
    /// Current status
    pub status: WorkflowStatus,
    /// Outcome once completed (`success`, `failure`, ...)
    pub conclusion: Option<String>,
    /// Web URL of the run
    pub html_url: String,
    /// Branch or tag the run executes on
    pub head_branch: Option<String>,
    /// When the run was created
    pub created_at: Option<DateTime<Utc>>,
}

/// What the workflow waiter polls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowTarget {
    /// Repository running the workflow
    pub repo: RepoRef,
    /// Restrict to runs on this branch (`None` = most recent run overall)
    pub branch: Option<String>,
    /// Ignore runs created before this instant (the release or dispatch
    /// that should have started the run)
    pub not_before: Option<DateTime<Utc>>,
}

impl fmt::Display for WorkflowTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.branch {
            Some(branch) => write!(f, "{}@{branch}", self.repo),
            None => write!(f, "{}", self.repo),
        }
    }
}

/// Where a workflow is dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTarget {
    /// Repository owning the workflow
    pub repo: RepoRef,
    /// Git ref the workflow runs on (branch name)
    pub ref_name: String,
}

/// Deployment repository and manifest associated with a source repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    /// Deployment repository
    pub repo: RepoRef,
    /// Path of the manifest to patch
    pub manifest_path: String,
    /// Workflow file dispatched after the bump
    pub workflow: String,
}

/// Branch in the deployment repository carrying a version bump
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentBranch {
    /// Full ref name (`refs/heads/...`)
    pub ref_name: String,
    /// Default-branch head the branch was (or would be) created from
    pub base_sha: String,
    /// Source repository whose version is bumped
    pub source_repo: String,
    /// Version targeted by this branch, without rc suffix
    pub future_tag: String,
    /// Whether this run created the branch
    pub created: bool,
    /// Tag occurrences replaced in the manifest
    pub replacements: usize,
}

impl DeploymentBranch {
    /// Branch name without the `refs/heads/` prefix
    pub fn name(&self) -> &str {
        self.ref_name
            .strip_prefix("refs/heads/")
            .unwrap_or(&self.ref_name)
    }
}
