//! Release planning
//!
//! Works out the old tag, the new tag and the deployment branch without
//! changing anything on the hosting platform.

use crate::config::Settings;
use crate::deploy::deployment_branch_name;
use crate::error::Result;
use crate::platform::HostingService;
use crate::release::{SelectOptions, TagSource, build_release_record, resolve_old_tag};
use crate::types::{DeploymentTarget, ReleaseRecord, RepoRef};
use crate::version::{ChangeClass, Tag, resolve_next_tag};
use tracing::{debug, warn};

/// Shared inputs for every pipeline stage
pub struct PipelineContext<'a> {
    /// Hosting platform
    pub platform: &'a dyn HostingService,
    /// Repository being released
    pub source: RepoRef,
    /// Branch the release is cut from
    pub branch: String,
    /// Deployment repository and manifest for `source`
    pub deployment: DeploymentTarget,
    /// Global settings
    pub settings: Settings,
}

/// What the operator asked for
#[derive(Debug, Clone, Default)]
pub struct PipelineRequest {
    /// Kind of version change
    pub change: ChangeClass,
    /// Explicit baseline tag
    pub tag_override: Option<String>,
    /// Inputs passed to the deploy workflow
    pub workflow_inputs: serde_json::Value,
}

/// Resolved release plan
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    /// Baseline tag
    pub old_tag: Tag,
    /// How the baseline was chosen
    pub tag_source: TagSource,
    /// Tag to release
    pub new_tag: Tag,
    /// Invoking user's login, empty when unknown
    pub acting_user: String,
    /// Deployment branch that will carry the bump
    pub deployment_branch: String,
    /// Release to create
    pub release: ReleaseRecord,
}

/// User segment for deployment branch names
pub fn branch_user<'u>(settings: &Settings, acting_user: &'u str) -> &'u str {
    if settings.include_user_in_branch {
        acting_user
    } else {
        ""
    }
}

/// Resolve the invoking user; failures are logged and yield an empty login
pub async fn resolve_acting_user(platform: &dyn HostingService) -> String {
    match platform.current_user().await {
        Ok(login) => login,
        Err(e) => {
            warn!("Failed to get username, continuing without it: {e}");
            String::new()
        }
    }
}

/// Build the release plan
///
/// Fails before any side effect on malformed tags, unsupported change
/// classes, or when no baseline tag exists.
pub async fn create_release_plan(
    ctx: &PipelineContext<'_>,
    request: &PipelineRequest,
) -> Result<ReleasePlan> {
    let acting_user = resolve_acting_user(ctx.platform).await;

    let selection = resolve_old_tag(
        ctx.platform,
        &ctx.source,
        &ctx.branch,
        &SelectOptions {
            user_override: request.tag_override.as_deref(),
            acting_user: Some(acting_user.as_str()),
            filter_by_user: ctx.settings.filter_tags_by_user,
            history_limit: ctx.settings.tag_history_limit,
        },
    )
    .await?;
    debug!("Selected {} ({:?})", selection.tag, selection.source);

    let old_tag: Tag = selection.tag.parse()?;
    let new_tag = resolve_next_tag(&old_tag, request.change)?;

    let deployment_branch = deployment_branch_name(
        branch_user(&ctx.settings, &acting_user),
        &ctx.source.name,
        &new_tag,
    );
    let release = build_release_record(&new_tag, &ctx.branch, &ctx.settings.release_body);

    Ok(ReleasePlan {
        old_tag,
        tag_source: selection.source,
        new_tag,
        acting_user,
        deployment_branch,
        release,
    })
}

/// Human-readable description of a plan
pub fn describe_plan(ctx: &PipelineContext<'_>, plan: &ReleasePlan) -> Vec<String> {
    let source = match plan.tag_source {
        TagSource::Override => "override",
        TagSource::BranchTip => "branch head",
        TagSource::LatestRelease => "latest release",
    };
    let kind = if plan.release.is_prerelease {
        "pre-release"
    } else {
        "release"
    };

    vec![
        format!("Old tag: {} (from {source})", plan.old_tag),
        format!("New tag: {}", plan.new_tag),
        format!(
            "Would create {kind} {} on {} from {}",
            plan.new_tag, ctx.source, ctx.branch
        ),
        format!(
            "Would bump {} in {} on branch {}",
            ctx.deployment.manifest_path, ctx.deployment.repo, plan.deployment_branch
        ),
        format!(
            "Would dispatch {} on {}",
            ctx.deployment.workflow, plan.deployment_branch
        ),
    ]
}
