//! Hosting platform services
//!
//! Everything that talks to the source code host goes through
//! [`HostingService`], so release and deployment logic can run against a mock.

mod detection;
mod factory;
mod github;

pub use detection::{is_github_host, parse_repo_spec};
pub use factory::create_hosting_service;
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{
    FileContent, PublishedRelease, ReleaseInfo, ReleaseRecord, RepoRef, RepoTag, WorkflowRun,
};
use async_trait::async_trait;

/// Hosting platform operations used by the release pipeline
#[async_trait]
pub trait HostingService: Send + Sync {
    /// Login of the authenticated user
    async fn current_user(&self) -> Result<String>;

    /// Most recent tags, newest first
    async fn list_tags(&self, repo: &RepoRef, limit: u8) -> Result<Vec<RepoTag>>;

    /// Most recent releases, newest first
    async fn list_releases(&self, repo: &RepoRef, limit: u8) -> Result<Vec<ReleaseInfo>>;

    /// Login of the GitHub user who authored a commit, if linked to an account
    async fn commit_author(&self, repo: &RepoRef, sha: &str) -> Result<Option<String>>;

    /// Head commit SHA of a branch in a repository
    async fn branch_head(&self, repo: &RepoRef, branch: &str) -> Result<String>;

    /// Name of the repository's default branch
    async fn default_branch(&self, repo: &RepoRef) -> Result<String>;

    /// SHA a fully-qualified ref (`refs/heads/...`) points at, `None` if absent
    async fn get_ref(&self, repo: &RepoRef, ref_name: &str) -> Result<Option<String>>;

    /// Create a fully-qualified ref pointing at `sha`
    ///
    /// Returns `false` when the ref already exists; it is left untouched.
    async fn create_ref(&self, repo: &RepoRef, ref_name: &str, sha: &str) -> Result<bool>;

    /// Read a file from a branch
    async fn get_file(&self, repo: &RepoRef, path: &str, branch: &str) -> Result<FileContent>;

    /// Overwrite a file on a branch, only if its blob SHA still equals `sha`
    async fn update_file(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &str,
        content: &str,
        sha: &str,
        message: &str,
    ) -> Result<()>;

    /// Create a release
    async fn create_release(
        &self,
        repo: &RepoRef,
        release: &ReleaseRecord,
    ) -> Result<PublishedRelease>;

    /// Most recent workflow run, optionally restricted to a branch
    async fn latest_workflow_run(
        &self,
        repo: &RepoRef,
        branch: Option<&str>,
    ) -> Result<Option<WorkflowRun>>;

    /// Dispatch a workflow by file name on a ref
    async fn dispatch_workflow(
        &self,
        repo: &RepoRef,
        workflow: &str,
        ref_name: &str,
        inputs: &serde_json::Value,
    ) -> Result<()>;
}
