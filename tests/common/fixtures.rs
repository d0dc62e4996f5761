//! Test data factories for autodeployer types
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use autodeployer::config::Settings;
use autodeployer::types::{DeploymentTarget, RepoRef, WorkflowRun, WorkflowStatus};
use chrono::{TimeDelta, Utc};

/// Owner used by every fixture repository
pub const OWNER: &str = "acme";

/// Manifest path in the deployment repository
pub const MANIFEST_PATH: &str = "apps/svc-a/values.yaml";

/// Source repository `acme/svc-a`
pub fn source_repo() -> RepoRef {
    RepoRef::new(OWNER, "svc-a")
}

/// Deployment repository `acme/deployments`
pub fn deployment_repo() -> RepoRef {
    RepoRef::new(OWNER, "deployments")
}

/// Deployment target for `svc-a`
pub fn deployment_target() -> DeploymentTarget {
    DeploymentTarget {
        repo: deployment_repo(),
        manifest_path: MANIFEST_PATH.to_string(),
        workflow: "deploy.yml".to_string(),
    }
}

/// Settings with every delay removed
pub fn fast_settings() -> Settings {
    Settings {
        owner: Some(OWNER.to_string()),
        workflow_retry_limit: 5,
        workflow_retry_wait_seconds: 0,
        release_settle_seconds: 0,
        ..Settings::default()
    }
}

/// Create a workflow run snapshot
pub fn make_run(id: u64, status: WorkflowStatus, conclusion: Option<&str>) -> WorkflowRun {
    WorkflowRun {
        id,
        status,
        conclusion: conclusion.map(ToString::to_string),
        html_url: format!("https://github.com/acme/repo/actions/runs/{id}"),
        head_branch: None,
        created_at: Some(Utc::now()),
    }
}

/// A run that is still executing
pub fn running(id: u64) -> Option<WorkflowRun> {
    Some(make_run(id, WorkflowStatus::InProgress, None))
}

/// A run that finished with `conclusion`
pub fn finished(id: u64, conclusion: &str) -> Option<WorkflowRun> {
    Some(make_run(id, WorkflowStatus::Completed, Some(conclusion)))
}

/// A run that finished an hour ago, before anything the test triggers
pub fn finished_earlier(id: u64, conclusion: &str) -> Option<WorkflowRun> {
    let mut run = make_run(id, WorkflowStatus::Completed, Some(conclusion));
    run.created_at = Some(Utc::now() - TimeDelta::hours(1));
    Some(run)
}

/// Manifest text referencing `tag`
pub fn manifest(tag: &str) -> String {
    format!("image:\n  repository: ghcr.io/acme/svc-a\n  tag: {tag}\nreplicas: 2\n")
}
