//! Release execution
//!
//! Runs the plan against the hosting platform, one stage at a time.

use crate::deploy::{BumpRequest, bump_deployment};
use crate::error::Result;
use crate::pipeline::plan::{
    PipelineContext, PipelineRequest, ReleasePlan, branch_user, describe_plan,
};
use crate::pipeline::{Phase, ProgressCallback};
use crate::release::publish_release;
use crate::types::{
    DeploymentBranch, DispatchTarget, PublishedRelease, WorkflowRun, WorkflowTarget,
};
use crate::workflow::{PollPolicy, trigger_workflow, wait_for_completion};
use chrono::Utc;
use tracing::warn;

/// Result of a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Release created on the source repository
    pub release: Option<PublishedRelease>,
    /// Build run observed after the release
    pub build_run: Option<WorkflowRun>,
    /// Deployment branch carrying the bump
    pub deployment_branch: Option<DeploymentBranch>,
    /// Deploy run observed on the deployment branch
    pub deploy_run: Option<WorkflowRun>,
    /// Non-fatal problems
    pub warnings: Vec<String>,
}

impl PipelineReport {
    /// Whether every stage ran without a recorded problem
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Record a completed run whose conclusion is not `success`
    fn note_conclusion(&mut self, what: &str, run: &WorkflowRun) {
        let conclusion = run.conclusion.as_deref().unwrap_or("unknown");
        if conclusion != "success" {
            self.warnings.push(format!(
                "{what} workflow run {} completed with conclusion '{conclusion}'",
                run.id
            ));
        }
    }
}

fn poll_policy(ctx: &PipelineContext<'_>) -> PollPolicy {
    PollPolicy {
        interval: ctx.settings.poll_interval(),
        max_attempts: ctx.settings.workflow_retry_limit,
        require_success: ctx.settings.require_successful_conclusion,
    }
}

async fn settle(ctx: &PipelineContext<'_>, progress: &dyn ProgressCallback, what: &str) {
    let delay = ctx.settings.release_settle_delay();
    if delay.is_zero() {
        return;
    }
    progress
        .on_message(&format!(
            "Waiting {} seconds before checking the {what} workflow...",
            delay.as_secs()
        ))
        .await;
    tokio::time::sleep(delay).await;
}

/// Execute a release plan
///
/// Stages run strictly in order:
/// 1. Create the release
/// 2. Wait for the build workflow
/// 3. Bump the deployment manifest
/// 4. Dispatch the deploy workflow
/// 5. Wait for the deploy workflow
///
/// Every remote mutation is idempotent or guarded, so an interrupted run can
/// be repeated from the start.
pub async fn execute_release_plan(
    ctx: &PipelineContext<'_>,
    plan: &ReleasePlan,
    request: &PipelineRequest,
    progress: &dyn ProgressCallback,
    dry_run: bool,
) -> Result<PipelineReport> {
    let mut report = PipelineReport {
        dry_run,
        ..PipelineReport::default()
    };

    if dry_run {
        progress.on_message("Dry run - no changes will be made").await;
        for line in describe_plan(ctx, plan) {
            progress.on_message(&line).await;
        }
        return Ok(report);
    }

    let policy = poll_policy(ctx);

    // Phase: Publishing the release
    progress.on_phase(Phase::PublishingRelease).await;
    let released_at = Utc::now();
    let release = publish_release(ctx.platform, &ctx.source, &plan.release).await?;
    progress.on_release_created(&release).await;
    report.release = Some(release);

    // Phase: Waiting for the build
    settle(ctx, progress, "build").await;
    progress.on_phase(Phase::WaitingForBuild).await;
    let build_target = WorkflowTarget {
        repo: ctx.source.clone(),
        branch: None,
        not_before: Some(released_at),
    };
    let build_run = wait_for_completion(ctx.platform, &build_target, &policy, progress).await?;
    report.note_conclusion("Build", &build_run);
    report.build_run = Some(build_run);

    // Phase: Bumping the deployment
    progress.on_phase(Phase::BumpingDeployment).await;
    let branch = bump_deployment(
        ctx.platform,
        &BumpRequest {
            target: &ctx.deployment,
            source_repo: &ctx.source.name,
            acting_user: branch_user(&ctx.settings, &plan.acting_user),
            old_tag: &plan.old_tag,
            new_tag: &plan.new_tag,
        },
    )
    .await?;
    progress.on_branch_ready(&branch).await;

    // Phase: Triggering the deploy
    progress.on_phase(Phase::TriggeringDeploy).await;
    let dispatch = DispatchTarget {
        repo: ctx.deployment.repo.clone(),
        ref_name: branch.name().to_string(),
    };
    let dispatched_at = Utc::now();
    let dispatched = trigger_workflow(
        ctx.platform,
        &dispatch,
        &ctx.deployment.workflow,
        &request.workflow_inputs,
    )
    .await;

    match dispatched {
        Ok(()) => {
            // Phase: Waiting for the deploy
            settle(ctx, progress, "deploy").await;
            progress.on_phase(Phase::WaitingForDeploy).await;
            let deploy_target = WorkflowTarget {
                repo: ctx.deployment.repo.clone(),
                branch: Some(branch.name().to_string()),
                not_before: Some(dispatched_at),
            };
            let deploy_run =
                wait_for_completion(ctx.platform, &deploy_target, &policy, progress).await?;
            report.note_conclusion("Deploy", &deploy_run);
            report.deploy_run = Some(deploy_run);
        }
        Err(e) if !ctx.settings.fail_on_dispatch_error => {
            warn!("Deploy workflow dispatch failed: {e}");
            progress.on_error(&e).await;
            report.warnings.push(format!(
                "Failed to trigger '{}' workflow on {}: {e}",
                ctx.deployment.workflow, dispatch.ref_name
            ));
        }
        Err(e) => return Err(e),
    }

    report.deployment_branch = Some(branch);
    progress.on_phase(Phase::Complete).await;

    Ok(report)
}
