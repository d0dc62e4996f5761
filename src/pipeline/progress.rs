//! Progress callback trait for interface-agnostic updates
//!
//! This trait allows different interfaces (CLI, CI logs, etc.) to receive
//! progress updates while a release moves through the pipeline.

use crate::error::Error;
use crate::types::{DeploymentBranch, PublishedRelease, WorkflowTarget};
use crate::workflow::WorkflowPoll;
use async_trait::async_trait;
use std::fmt;

/// Pipeline phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Selecting the baseline tag and computing the next one
    ResolvingTag,
    /// Creating the release on the source repository
    PublishingRelease,
    /// Waiting for the release build workflow
    WaitingForBuild,
    /// Patching the deployment manifest
    BumpingDeployment,
    /// Dispatching the deploy workflow
    TriggeringDeploy,
    /// Waiting for the deploy workflow
    WaitingForDeploy,
    /// Pipeline finished
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ResolvingTag => "Determining new release tag",
            Self::PublishingRelease => "Creating new release",
            Self::WaitingForBuild => "Waiting for build workflow",
            Self::BumpingDeployment => "Bumping deployment manifest",
            Self::TriggeringDeploy => "Triggering deploy workflow",
            Self::WaitingForDeploy => "Waiting for deploy workflow",
            Self::Complete => "Done",
        };
        f.write_str(label)
    }
}

/// Progress callback trait
///
/// Implement this trait to receive progress updates during a release.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called after every workflow poll
    async fn on_workflow_poll(&self, target: &WorkflowTarget, poll: &WorkflowPoll);

    /// Called when the release was created
    async fn on_release_created(&self, release: &PublishedRelease);

    /// Called when the deployment branch holds the bump
    async fn on_branch_ready(&self, branch: &DeploymentBranch);

    /// Called when an error occurs (non-fatal)
    async fn on_error(&self, error: &Error);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_workflow_poll(&self, _target: &WorkflowTarget, _poll: &WorkflowPoll) {}
    async fn on_release_created(&self, _release: &PublishedRelease) {}
    async fn on_branch_ready(&self, _branch: &DeploymentBranch) {}
    async fn on_error(&self, _error: &Error) {}
    async fn on_message(&self, _message: &str) {}
}
