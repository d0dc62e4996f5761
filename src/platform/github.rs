//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::HostingService;
use crate::types::{
    FileContent, PublishedRelease, ReleaseInfo, ReleaseRecord, RepoRef, RepoTag, WorkflowRun,
    WorkflowStatus,
};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
}

#[derive(Deserialize)]
struct User {
    login: String,
}

#[derive(Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Deserialize)]
struct Tag {
    name: String,
    commit: CommitRef,
}

#[derive(Deserialize)]
struct Release {
    id: u64,
    tag_name: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    prerelease: bool,
    #[serde(default)]
    draft: bool,
}

#[derive(Deserialize)]
struct Commit {
    author: Option<User>,
}

#[derive(Deserialize)]
struct Branch {
    commit: CommitRef,
}

#[derive(Deserialize)]
struct Repository {
    default_branch: Option<String>,
}

#[derive(Deserialize)]
struct GitRef {
    object: CommitRef,
}

#[derive(Deserialize)]
struct Contents {
    path: String,
    sha: String,
    content: Option<String>,
    encoding: Option<String>,
}

#[derive(Deserialize)]
struct RunList {
    workflow_runs: Vec<Run>,
}

#[derive(Deserialize)]
struct Run {
    id: u64,
    status: Option<String>,
    conclusion: Option<String>,
    #[serde(default)]
    html_url: String,
    head_branch: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
}

#[derive(Serialize)]
struct RunParams<'a> {
    per_page: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Serialize)]
struct RefParams<'a> {
    #[serde(rename = "ref")]
    ref_name: &'a str,
}

#[derive(Serialize)]
struct CreateRefPayload<'a> {
    #[serde(rename = "ref")]
    ref_name: &'a str,
    sha: &'a str,
}

#[derive(Serialize)]
struct UpdateFilePayload<'a> {
    message: &'a str,
    content: String,
    sha: &'a str,
    branch: &'a str,
}

#[derive(Serialize)]
struct CreateReleasePayload<'a> {
    tag_name: &'a str,
    target_commitish: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
    prerelease: bool,
}

/// HTTP status of a GitHub error response, if the error is one
fn status_code(err: &octocrab::Error) -> Option<u16> {
    match err {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    }
}

/// GitHub answers 422 "Reference already exists" when a ref is created twice
fn is_existing_ref(err: &octocrab::Error) -> bool {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            source.status_code.as_u16() == 422
                && source.message.to_ascii_lowercase().contains("already exists")
        }
        _ => false,
    }
}

impl GitHubService {
    /// Create a new GitHub service, optionally for a GitHub Enterprise host
    pub fn new(token: &str, host: Option<String>) -> Result<Self> {
        let base_uri = host.map(|h| format!("https://{h}/api/v3"));
        Self::with_base_uri(token, base_uri.as_deref())
    }

    /// Create a service talking to an explicit API root
    pub fn with_base_uri(token: &str, base_uri: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(uri) = base_uri {
            builder = builder
                .base_uri(uri)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder.build().map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self { client })
    }

    fn repo_route(repo: &RepoRef, rest: &str) -> String {
        format!("/repos/{}/{}{rest}", repo.owner, repo.name)
    }
}

#[async_trait]
impl HostingService for GitHubService {
    async fn current_user(&self) -> Result<String> {
        let user: User = self.client.get("/user", None::<&()>).await?;
        Ok(user.login)
    }

    async fn list_tags(&self, repo: &RepoRef, limit: u8) -> Result<Vec<RepoTag>> {
        let tags: Vec<Tag> = self
            .client
            .get(
                Self::repo_route(repo, "/tags"),
                Some(&PageParams { per_page: limit }),
            )
            .await?;

        Ok(tags
            .into_iter()
            .map(|t| RepoTag {
                name: t.name,
                commit_sha: t.commit.sha,
            })
            .collect())
    }

    async fn list_releases(&self, repo: &RepoRef, limit: u8) -> Result<Vec<ReleaseInfo>> {
        let releases: Vec<Release> = self
            .client
            .get(
                Self::repo_route(repo, "/releases"),
                Some(&PageParams { per_page: limit }),
            )
            .await?;

        Ok(releases
            .into_iter()
            .map(|r| ReleaseInfo {
                tag_name: r.tag_name,
                prerelease: r.prerelease,
                draft: r.draft,
            })
            .collect())
    }

    async fn commit_author(&self, repo: &RepoRef, sha: &str) -> Result<Option<String>> {
        let commit: Commit = self
            .client
            .get(Self::repo_route(repo, &format!("/commits/{sha}")), None::<&()>)
            .await?;
        Ok(commit.author.map(|a| a.login))
    }

    async fn branch_head(&self, repo: &RepoRef, branch: &str) -> Result<String> {
        let branch: Branch = self
            .client
            .get(
                Self::repo_route(repo, &format!("/branches/{branch}")),
                None::<&()>,
            )
            .await?;
        Ok(branch.commit.sha)
    }

    async fn default_branch(&self, repo: &RepoRef) -> Result<String> {
        let repository: Repository = self
            .client
            .get(Self::repo_route(repo, ""), None::<&()>)
            .await?;
        repository
            .default_branch
            .ok_or_else(|| Error::GitHubApi(format!("{repo} has no default branch")))
    }

    async fn get_ref(&self, repo: &RepoRef, ref_name: &str) -> Result<Option<String>> {
        let short = ref_name.strip_prefix("refs/").unwrap_or(ref_name);
        let result: std::result::Result<GitRef, _> = self
            .client
            .get(
                Self::repo_route(repo, &format!("/git/ref/{short}")),
                None::<&()>,
            )
            .await;

        match result {
            Ok(git_ref) => Ok(Some(git_ref.object.sha)),
            Err(e) if status_code(&e) == Some(404) => {
                debug!("ref {ref_name} not found in {repo}");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_ref(&self, repo: &RepoRef, ref_name: &str, sha: &str) -> Result<bool> {
        let result: std::result::Result<serde_json::Value, _> = self
            .client
            .post(
                Self::repo_route(repo, "/git/refs"),
                Some(&CreateRefPayload { ref_name, sha }),
            )
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_existing_ref(&e) => {
                debug!("ref {ref_name} already exists in {repo}");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_file(&self, repo: &RepoRef, path: &str, branch: &str) -> Result<FileContent> {
        let contents: Contents = self
            .client
            .get(
                Self::repo_route(repo, &format!("/contents/{path}")),
                Some(&RefParams { ref_name: branch }),
            )
            .await?;

        if contents.encoding.as_deref().is_some_and(|e| e != "base64") {
            return Err(Error::GitHubApi(format!(
                "{path}: unsupported content encoding {:?}",
                contents.encoding
            )));
        }

        let encoded: String = contents
            .content
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| Error::GitHubApi(format!("{path}: invalid base64 content: {e}")))?;
        let content = String::from_utf8(bytes)
            .map_err(|e| Error::GitHubApi(format!("{path}: content is not UTF-8: {e}")))?;

        Ok(FileContent {
            path: contents.path,
            content,
            sha: contents.sha,
        })
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
        let payload = UpdateFilePayload {
            message,
            content: BASE64.encode(content),
            sha,
            branch,
        };

        let result: std::result::Result<serde_json::Value, _> = self
            .client
            .put(Self::repo_route(repo, &format!("/contents/{path}")), Some(&payload))
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if status_code(&e) == Some(409) => Err(Error::ConcurrentModification {
                path: path.to_string(),
                branch: branch.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_release(
        &self,
        repo: &RepoRef,
        release: &ReleaseRecord,
    ) -> Result<PublishedRelease> {
        let payload = CreateReleasePayload {
            tag_name: &release.tag,
            target_commitish: &release.target_branch,
            name: &release.title,
            body: &release.body,
            draft: false,
            prerelease: release.is_prerelease,
        };

        let created: Release = self
            .client
            .post(Self::repo_route(repo, "/releases"), Some(&payload))
            .await?;

        Ok(PublishedRelease {
            id: created.id,
            tag_name: created.tag_name,
            html_url: created.html_url,
        })
    }

    async fn latest_workflow_run(
        &self,
        repo: &RepoRef,
        branch: Option<&str>,
    ) -> Result<Option<WorkflowRun>> {
        let runs: RunList = self
            .client
            .get(
                Self::repo_route(repo, "/actions/runs"),
                Some(&RunParams {
                    per_page: 1,
                    branch,
                }),
            )
            .await?;

        Ok(runs.workflow_runs.into_iter().next().map(|run| WorkflowRun {
            id: run.id,
            status: WorkflowStatus::from_api(run.status.as_deref().unwrap_or_default()),
            conclusion: run.conclusion,
            html_url: run.html_url,
            head_branch: run.head_branch,
            created_at: run.created_at,
        }))
    }

    async fn dispatch_workflow(
        &self,
        repo: &RepoRef,
        workflow: &str,
        ref_name: &str,
        inputs: &serde_json::Value,
    ) -> Result<()> {
        let actions = self.client.actions();
        let mut dispatch = actions.create_workflow_dispatch(
            &repo.owner,
            &repo.name,
            workflow,
            ref_name,
        );
        if !inputs.is_null() {
            dispatch = dispatch.inputs(inputs.clone());
        }
        dispatch.send().await?;
        Ok(())
    }
}
