//! Deployment manifest bump
//!
//! Creates (or reuses) a branch in the deployment repository and rewrites the
//! source repository's version in the manifest on that branch.

use crate::deploy::branch::{branch_ref, deployment_branch_name};
use crate::deploy::manifest::replace_tag;
use crate::error::{Error, Result};
use crate::platform::HostingService;
use crate::types::{DeploymentBranch, DeploymentTarget};
use crate::version::Tag;
use tracing::{debug, info};

/// Everything needed to bump one deployment
#[derive(Debug, Clone)]
pub struct BumpRequest<'a> {
    /// Deployment repository and manifest
    pub target: &'a DeploymentTarget,
    /// Source repository name (used in the branch name)
    pub source_repo: &'a str,
    /// Invoking user's login, empty when unknown
    pub acting_user: &'a str,
    /// Tag currently referenced by the manifest
    pub old_tag: &'a Tag,
    /// Tag to reference instead
    pub new_tag: &'a Tag,
}

/// Commit message for a bump
pub fn bump_commit_message(new_tag: &Tag) -> String {
    format!("Image tag bumped to {new_tag} using autodeployer")
}

/// Bump the manifest on the deployment branch
///
/// Safe to repeat: the branch is only created when missing, the manifest is
/// read from the branch itself, and nothing is written when it already
/// references the new tag. A manifest holding neither tag is an error
/// (`ManifestMismatch`), so the deploy is never dispatched for a bump that
/// did not happen. The write carries the blob SHA that was read, so a
/// concurrent edit fails with `ConcurrentModification` instead of being lost.
pub async fn bump_deployment(
    platform: &dyn HostingService,
    request: &BumpRequest<'_>,
) -> Result<DeploymentBranch> {
    let repo = &request.target.repo;
    let path = &request.target.manifest_path;

    let default_branch = platform.default_branch(repo).await?;
    let base_sha = platform.branch_head(repo, &default_branch).await?;
    debug!("{repo} default branch {default_branch} at {base_sha}");

    let branch =
        deployment_branch_name(request.acting_user, request.source_repo, request.new_tag);
    let ref_name = branch_ref(&branch);

    // Another run may create the branch between the lookup and the create;
    // the content-SHA precondition on the write settles that race.
    let created = platform.get_ref(repo, &ref_name).await?.is_none()
        && platform.create_ref(repo, &ref_name, &base_sha).await?;
    if created {
        info!("Created branch {branch} in {repo} from {default_branch}");
    } else {
        info!("Branch {branch} already exists in {repo}, reusing it");
    }

    let file = platform.get_file(repo, path, &branch).await?;
    let old_tag = request.old_tag.to_string();
    let new_tag = request.new_tag.to_string();
    let patch = replace_tag(&file.content, &old_tag, &new_tag);

    if patch.is_noop() {
        if !file.content.contains(&new_tag) {
            return Err(Error::ManifestMismatch {
                path: path.clone(),
                branch,
                old_tag,
                new_tag,
            });
        }
        info!("{path} on {branch} already references {new_tag}");
    } else {
        platform
            .update_file(
                repo,
                path,
                &branch,
                &patch.content,
                &file.sha,
                &bump_commit_message(request.new_tag),
            )
            .await?;
        info!(
            "Replaced {} occurrence(s) of {old_tag} with {new_tag} in {path}",
            patch.replacements
        );
    }

    Ok(DeploymentBranch {
        ref_name,
        base_sha,
        source_repo: request.source_repo.to_string(),
        future_tag: request.new_tag.target_version().to_string(),
        created,
        replacements: patch.replacements,
    })
}
