//! Progress callback that records what it was told

#![allow(dead_code)]

use async_trait::async_trait;
use autodeployer::error::Error;
use autodeployer::pipeline::{Phase, ProgressCallback};
use autodeployer::types::{DeploymentBranch, PublishedRelease, WorkflowTarget};
use autodeployer::workflow::WorkflowPoll;
use std::sync::Mutex;

/// Records phases, polls, errors and messages for later assertions
#[derive(Default)]
pub struct RecordingProgress {
    phases: Mutex<Vec<Phase>>,
    polls: Mutex<Vec<(String, u32)>>,
    errors: Mutex<Vec<String>>,
    messages: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn phases(&self) -> Vec<Phase> {
        self.phases.lock().unwrap().clone()
    }

    /// `(target, attempt)` for every poll
    pub fn polls(&self) -> Vec<(String, u32)> {
        self.polls.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_phase(&self, phase: Phase) {
        self.phases.lock().unwrap().push(phase);
    }

    async fn on_workflow_poll(&self, target: &WorkflowTarget, poll: &WorkflowPoll) {
        self.polls
            .lock()
            .unwrap()
            .push((target.to_string(), poll.attempt));
    }

    async fn on_release_created(&self, _release: &PublishedRelease) {}

    async fn on_branch_ready(&self, _branch: &DeploymentBranch) {}

    async fn on_error(&self, error: &Error) {
        self.errors.lock().unwrap().push(error.to_string());
    }

    async fn on_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
