//! Mock hosting service for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use autodeployer::error::{Error, Result};
use autodeployer::platform::HostingService;
use autodeployer::types::{
    FileContent, PublishedRelease, ReleaseInfo, ReleaseRecord, RepoRef, RepoTag, WorkflowRun,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_release`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReleaseCall {
    pub repo: String,
    pub release: ReleaseRecord,
}

/// Call record for `create_ref`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRefCall {
    pub repo: String,
    pub ref_name: String,
    pub sha: String,
}

/// Call record for `update_file`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFileCall {
    pub repo: String,
    pub path: String,
    pub branch: String,
    pub content: String,
    pub sha: String,
    pub message: String,
}

/// Call record for `dispatch_workflow`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchCall {
    pub repo: String,
    pub workflow: String,
    pub ref_name: String,
    pub inputs: serde_json::Value,
}

/// Call record for `latest_workflow_run`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPollCall {
    pub repo: String,
    pub branch: Option<String>,
}

type FileKey = (String, String, String);

/// In-memory mock of the hosting platform
///
/// This manually implements `HostingService` rather than using mockall, so
/// state (refs, files, blob SHAs) behaves like a tiny repository host.
///
/// Features:
/// - Refs and per-branch files; creating a ref copies the default branch's files
/// - Blob SHAs that change on every write, with conflict detection
/// - Scripted workflow runs per (repo, branch); the last entry repeats
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockHostingService {
    user: Mutex<Option<String>>,
    tags: Mutex<HashMap<String, Vec<RepoTag>>>,
    releases: Mutex<HashMap<String, Vec<ReleaseInfo>>>,
    commit_authors: Mutex<HashMap<String, String>>,
    default_branches: Mutex<HashMap<String, String>>,
    refs: Mutex<HashMap<(String, String), String>>,
    files: Mutex<HashMap<FileKey, (String, String)>>,
    runs: Mutex<HashMap<(String, Option<String>), VecDeque<Option<WorkflowRun>>>>,
    next_id: AtomicU64,
    // Call tracking
    create_release_calls: Mutex<Vec<CreateReleaseCall>>,
    create_ref_calls: Mutex<Vec<CreateRefCall>>,
    update_file_calls: Mutex<Vec<UpdateFileCall>>,
    dispatch_calls: Mutex<Vec<DispatchCall>>,
    run_poll_calls: Mutex<Vec<RunPollCall>>,
    list_releases_calls: Mutex<u32>,
    // Error injection
    error_on_list_tags: Mutex<Option<String>>,
    error_on_commit_author: Mutex<Option<String>>,
    error_on_create_release: Mutex<Option<String>>,
    error_on_dispatch: Mutex<Option<String>>,
    conflict_on_update: Mutex<bool>,
    stale_ref_reads: Mutex<bool>,
}

impl Default for MockHostingService {
    fn default() -> Self {
        Self::new()
    }
}

fn key(repo: &RepoRef) -> String {
    repo.to_string()
}

impl MockHostingService {
    /// Create an empty mock; the acting user is `alice`
    pub fn new() -> Self {
        Self {
            user: Mutex::new(Some("alice".to_string())),
            tags: Mutex::new(HashMap::new()),
            releases: Mutex::new(HashMap::new()),
            commit_authors: Mutex::new(HashMap::new()),
            default_branches: Mutex::new(HashMap::new()),
            refs: Mutex::new(HashMap::new()),
            files: Mutex::new(HashMap::new()),
            runs: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            create_release_calls: Mutex::new(Vec::new()),
            create_ref_calls: Mutex::new(Vec::new()),
            update_file_calls: Mutex::new(Vec::new()),
            dispatch_calls: Mutex::new(Vec::new()),
            run_poll_calls: Mutex::new(Vec::new()),
            list_releases_calls: Mutex::new(0),
            error_on_list_tags: Mutex::new(None),
            error_on_commit_author: Mutex::new(None),
            error_on_create_release: Mutex::new(None),
            error_on_dispatch: Mutex::new(None),
            conflict_on_update: Mutex::new(false),
            stale_ref_reads: Mutex::new(false),
        }
    }

    fn next_sha(&self, prefix: &str) -> String {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}{id:04}")
    }

    fn default_branch_of(&self, repo: &RepoRef) -> String {
        self.default_branches
            .lock()
            .unwrap()
            .get(&key(repo))
            .cloned()
            .unwrap_or_else(|| "main".to_string())
    }

    // === State setup ===

    /// Set (or clear) the authenticated user
    pub fn set_user(&self, login: Option<&str>) {
        *self.user.lock().unwrap() = login.map(ToString::to_string);
    }

    /// Add a tag (newest tags should be added first)
    pub fn add_tag(&self, repo: &RepoRef, name: &str, sha: &str, author: &str) {
        self.tags
            .lock()
            .unwrap()
            .entry(key(repo))
            .or_default()
            .push(RepoTag {
                name: name.to_string(),
                commit_sha: sha.to_string(),
            });
        self.commit_authors
            .lock()
            .unwrap()
            .insert(sha.to_string(), author.to_string());
    }

    /// Add a release (newest releases should be added first)
    pub fn add_release(&self, repo: &RepoRef, tag: &str, prerelease: bool, draft: bool) {
        self.releases
            .lock()
            .unwrap()
            .entry(key(repo))
            .or_default()
            .push(ReleaseInfo {
                tag_name: tag.to_string(),
                prerelease,
                draft,
            });
    }

    /// Point a branch at a commit
    pub fn set_branch(&self, repo: &RepoRef, branch: &str, sha: &str) {
        self.refs
            .lock()
            .unwrap()
            .insert((key(repo), format!("refs/heads/{branch}")), sha.to_string());
    }

    /// Set the default branch (defaults to `main`)
    pub fn set_default_branch(&self, repo: &RepoRef, branch: &str) {
        self.default_branches
            .lock()
            .unwrap()
            .insert(key(repo), branch.to_string());
    }

    /// Write a file on a branch, returning its new blob SHA
    pub fn put_file(&self, repo: &RepoRef, branch: &str, path: &str, content: &str) -> String {
        let sha = self.next_sha("blob");
        self.files.lock().unwrap().insert(
            (key(repo), branch.to_string(), path.to_string()),
            (content.to_string(), sha.clone()),
        );
        sha
    }

    /// Current content of a file on a branch
    pub fn file(&self, repo: &RepoRef, branch: &str, path: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(&(key(repo), branch.to_string(), path.to_string()))
            .map(|(content, _)| content.clone())
    }

    /// Script the runs returned for a (repo, branch) target
    ///
    /// Each poll consumes one entry; the last entry keeps being returned.
    pub fn script_runs(
        &self,
        repo: &RepoRef,
        branch: Option<&str>,
        runs: Vec<Option<WorkflowRun>>,
    ) {
        self.runs
            .lock()
            .unwrap()
            .insert((key(repo), branch.map(ToString::to_string)), runs.into());
    }

    // === Error injection methods ===

    /// Make `list_tags` return an error
    pub fn fail_list_tags(&self, msg: &str) {
        *self.error_on_list_tags.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `commit_author` return an error
    pub fn fail_commit_author(&self, msg: &str) {
        *self.error_on_commit_author.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_release` return an error
    pub fn fail_create_release(&self, msg: &str) {
        *self.error_on_create_release.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `dispatch_workflow` return an error
    pub fn fail_dispatch(&self, msg: &str) {
        *self.error_on_dispatch.lock().unwrap() = Some(msg.to_string());
    }

    /// Make every `update_file` behave as if another writer got there first
    pub fn conflict_on_update(&self) {
        *self.conflict_on_update.lock().unwrap() = true;
    }

    /// Make `get_ref` report every ref as missing, as if another run created
    /// it between the check and the create
    pub fn stale_ref_reads(&self) {
        *self.stale_ref_reads.lock().unwrap() = true;
    }

    // === Call verification methods ===

    /// Get all `create_release` calls
    pub fn get_create_release_calls(&self) -> Vec<CreateReleaseCall> {
        self.create_release_calls.lock().unwrap().clone()
    }

    /// Get all `create_ref` calls
    pub fn get_create_ref_calls(&self) -> Vec<CreateRefCall> {
        self.create_ref_calls.lock().unwrap().clone()
    }

    /// Get all `update_file` calls
    pub fn get_update_file_calls(&self) -> Vec<UpdateFileCall> {
        self.update_file_calls.lock().unwrap().clone()
    }

    /// Get all `dispatch_workflow` calls
    pub fn get_dispatch_calls(&self) -> Vec<DispatchCall> {
        self.dispatch_calls.lock().unwrap().clone()
    }

    /// Get all `latest_workflow_run` calls
    pub fn get_run_poll_calls(&self) -> Vec<RunPollCall> {
        self.run_poll_calls.lock().unwrap().clone()
    }

    /// Number of `list_releases` calls
    pub fn list_releases_count(&self) -> u32 {
        *self.list_releases_calls.lock().unwrap()
    }

    /// Whether any remote state was changed
    pub fn has_mutations(&self) -> bool {
        !self.get_create_release_calls().is_empty()
            || !self.get_create_ref_calls().is_empty()
            || !self.get_update_file_calls().is_empty()
            || !self.get_dispatch_calls().is_empty()
    }
}

#[async_trait]
impl HostingService for MockHostingService {
    async fn current_user(&self) -> Result<String> {
        self.user
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::GitHubApi("401 Bad credentials".to_string()))
    }

    async fn list_tags(&self, repo: &RepoRef, limit: u8) -> Result<Vec<RepoTag>> {
        if let Some(msg) = self.error_on_list_tags.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        let tags = self.tags.lock().unwrap();
        Ok(tags
            .get(&key(repo))
            .map(|t| t.iter().take(usize::from(limit)).cloned().collect())
            .unwrap_or_default())
    }

    async fn list_releases(&self, repo: &RepoRef, limit: u8) -> Result<Vec<ReleaseInfo>> {
        *self.list_releases_calls.lock().unwrap() += 1;
        let releases = self.releases.lock().unwrap();
        Ok(releases
            .get(&key(repo))
            .map(|r| r.iter().take(usize::from(limit)).cloned().collect())
            .unwrap_or_default())
    }

    async fn commit_author(&self, _repo: &RepoRef, sha: &str) -> Result<Option<String>> {
        if let Some(msg) = self.error_on_commit_author.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(self.commit_authors.lock().unwrap().get(sha).cloned())
    }

    async fn branch_head(&self, repo: &RepoRef, branch: &str) -> Result<String> {
        self.refs
            .lock()
            .unwrap()
            .get(&(key(repo), format!("refs/heads/{branch}")))
            .cloned()
            .ok_or_else(|| Error::GitHubApi(format!("404 Branch not found: {branch}")))
    }

    async fn default_branch(&self, repo: &RepoRef) -> Result<String> {
        Ok(self.default_branch_of(repo))
    }

    async fn get_ref(&self, repo: &RepoRef, ref_name: &str) -> Result<Option<String>> {
        if *self.stale_ref_reads.lock().unwrap() {
            return Ok(None);
        }
        Ok(self
            .refs
            .lock()
            .unwrap()
            .get(&(key(repo), ref_name.to_string()))
            .cloned())
    }

    async fn create_ref(&self, repo: &RepoRef, ref_name: &str, sha: &str) -> Result<bool> {
        self.create_ref_calls.lock().unwrap().push(CreateRefCall {
            repo: key(repo),
            ref_name: ref_name.to_string(),
            sha: sha.to_string(),
        });

        {
            let mut refs = self.refs.lock().unwrap();
            let ref_key = (key(repo), ref_name.to_string());
            if refs.contains_key(&ref_key) {
                return Ok(false);
            }
            refs.insert(ref_key, sha.to_string());
        }

        // New branch starts with the default branch's tree
        let default_branch = self.default_branch_of(repo);
        let branch = ref_name.strip_prefix("refs/heads/").unwrap_or(ref_name);
        let mut files = self.files.lock().unwrap();
        let copied: Vec<_> = files
            .iter()
            .filter(|((r, b, _), _)| *r == key(repo) && *b == default_branch)
            .map(|((r, _, p), v)| ((r.clone(), branch.to_string(), p.clone()), v.clone()))
            .collect();
        files.extend(copied);
        Ok(true)
    }

    async fn get_file(&self, repo: &RepoRef, path: &str, branch: &str) -> Result<FileContent> {
        self.files
            .lock()
            .unwrap()
            .get(&(key(repo), branch.to_string(), path.to_string()))
            .map(|(content, sha)| FileContent {
                path: path.to_string(),
                content: content.clone(),
                sha: sha.clone(),
            })
            .ok_or_else(|| Error::GitHubApi(format!("404 Not Found: {path}@{branch}")))
    }

    async fn update_file(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &str,
        content: &str,
        sha: &str,
        message: &str,
    ) -> Result<()> {
        self.update_file_calls.lock().unwrap().push(UpdateFileCall {
            repo: key(repo),
            path: path.to_string(),
            branch: branch.to_string(),
            content: content.to_string(),
            sha: sha.to_string(),
            message: message.to_string(),
        });

        let conflict = || Error::ConcurrentModification {
            path: path.to_string(),
            branch: branch.to_string(),
        };
        if *self.conflict_on_update.lock().unwrap() {
            return Err(conflict());
        }

        let new_sha = self.next_sha("blob");
        let mut files = self.files.lock().unwrap();
        let entry = files
            .get_mut(&(key(repo), branch.to_string(), path.to_string()))
            .ok_or_else(|| Error::GitHubApi(format!("404 Not Found: {path}@{branch}")))?;
        if entry.1 != sha {
            return Err(conflict());
        }
        *entry = (content.to_string(), new_sha);
        Ok(())
    }

    async fn create_release(
        &self,
        repo: &RepoRef,
        release: &ReleaseRecord,
    ) -> Result<PublishedRelease> {
        self.create_release_calls
            .lock()
            .unwrap()
            .push(CreateReleaseCall {
                repo: key(repo),
                release: release.clone(),
            });

        if let Some(msg) = self.error_on_create_release.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }

        self.add_release(repo, &release.tag, release.is_prerelease, false);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(PublishedRelease {
            id,
            tag_name: release.tag.clone(),
            html_url: format!("https://github.com/{repo}/releases/tag/{}", release.tag),
        })
    }

    async fn latest_workflow_run(
        &self,
        repo: &RepoRef,
        branch: Option<&str>,
    ) -> Result<Option<WorkflowRun>> {
        self.run_poll_calls.lock().unwrap().push(RunPollCall {
            repo: key(repo),
            branch: branch.map(ToString::to_string),
        });

        let mut runs = self.runs.lock().unwrap();
        let Some(queue) = runs.get_mut(&(key(repo), branch.map(ToString::to_string))) else {
            return Ok(None);
        };
        if queue.len() > 1 {
            Ok(queue.pop_front().flatten())
        } else {
            Ok(queue.front().cloned().flatten())
        }
    }

    async fn dispatch_workflow(
        &self,
        repo: &RepoRef,
        workflow: &str,
        ref_name: &str,
        inputs: &serde_json::Value,
    ) -> Result<()> {
        self.dispatch_calls.lock().unwrap().push(DispatchCall {
            repo: key(repo),
            workflow: workflow.to_string(),
            ref_name: ref_name.to_string(),
            inputs: inputs.clone(),
        });

        if let Some(msg) = self.error_on_dispatch.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(())
    }
}
