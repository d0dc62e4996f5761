//! Deploy command - release a repository and roll the tag into its deployment

use crate::cli::progress::CliProgress;
use crate::cli::style::{Stylize, arrow, check, cross};
use anstream::{eprintln, println};
use autodeployer::config::Config;
use autodeployer::error::{Error, Result};
use autodeployer::pipeline::{
    Phase, PipelineContext, PipelineReport, PipelineRequest, ProgressCallback, ReleasePlan,
    create_release_plan, execute_release_plan,
};
use autodeployer::platform::{create_hosting_service, parse_repo_spec};
use autodeployer::version::ChangeClass;
use dialoguer::Confirm;
use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

/// Options for the deploy command
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Repository to release
    pub repo: String,
    /// Branch to release from
    pub branch: String,
    /// Baseline tag override
    pub old_tag: Option<String>,
    /// Kind of version change
    pub change: ChangeClass,
    /// Deploy workflow inputs
    pub inputs: Vec<(String, String)>,
    /// Only show the plan
    pub dry_run: bool,
    /// Skip the confirmation prompt
    pub assume_yes: bool,
    /// Overall deadline
    pub timeout: Option<Duration>,
}

/// Parse a `KEY=VALUE` workflow input
pub fn parse_input(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

fn workflow_inputs(inputs: &[(String, String)]) -> serde_json::Value {
    if inputs.is_empty() {
        return serde_json::Value::Null;
    }
    inputs
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

/// Run the deploy command
pub async fn run_deploy(config_path: Option<&Path>, options: &DeployOptions) -> Result<()> {
    match options.timeout {
        Some(limit) => tokio::time::timeout(limit, deploy(config_path, options))
            .await
            .map_err(|_| {
                Error::Cancelled(format!("deploy did not finish within {}s", limit.as_secs()))
            })?,
        None => deploy(config_path, options).await,
    }
}

async fn deploy(config_path: Option<&Path>, options: &DeployOptions) -> Result<()> {
    let config = Config::load(config_path)?;
    let source = parse_repo_spec(
        &options.repo,
        config.settings.owner.as_deref(),
        config.settings.host.as_deref(),
    )?;
    let deployment = config.deployment_target(&source.name)?;
    let platform = create_hosting_service(&config).await?;

    let ctx = PipelineContext {
        platform: platform.as_ref(),
        source,
        branch: options.branch.clone(),
        deployment,
        settings: config.settings.clone(),
    };
    let request = PipelineRequest {
        change: options.change,
        tag_override: options.old_tag.clone(),
        workflow_inputs: workflow_inputs(&options.inputs),
    };

    let progress = CliProgress::new();
    progress.on_phase(Phase::ResolvingTag).await;
    let plan = create_release_plan(&ctx, &request).await?;

    if options.dry_run {
        execute_release_plan(&ctx, &plan, &request, &progress, true).await?;
        return Ok(());
    }

    print_plan(&ctx, &plan);
    if !options.assume_yes && !confirm(&ctx, &plan)? {
        println!("{}", "Aborted".muted());
        return Ok(());
    }

    let report = execute_release_plan(&ctx, &plan, &request, &progress, false).await?;
    print_summary(&report);
    Ok(())
}

fn print_plan(ctx: &PipelineContext<'_>, plan: &ReleasePlan) {
    println!(
        "{} {} {} {}",
        arrow(),
        plan.old_tag.to_string().muted(),
        "->".muted(),
        plan.new_tag.to_string().accent()
    );
    println!(
        "  Release {} from {}",
        ctx.source.to_string().emphasis(),
        ctx.branch.accent()
    );
    println!(
        "  Bump {} in {} on {}",
        ctx.deployment.manifest_path.accent(),
        ctx.deployment.repo.to_string().emphasis(),
        plan.deployment_branch.accent()
    );
    println!();
}

fn confirm(ctx: &PipelineContext<'_>, plan: &ReleasePlan) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        return Err(Error::Config(
            "stdin is not a terminal; pass --yes to deploy without confirmation".to_string(),
        ));
    }
    Confirm::new()
        .with_prompt(format!("Release {} on {}?", plan.new_tag, ctx.source))
        .default(false)
        .interact()
        .map_err(|e| Error::Internal(format!("confirmation prompt failed: {e}")))
}

fn print_summary(report: &PipelineReport) {
    println!();
    if let Some(release) = &report.release {
        println!("{} Released {}", check(), release.tag_name.accent());
    }
    if let Some(branch) = &report.deployment_branch {
        println!("{} Deployment branch {}", check(), branch.name().accent());
    }
    if let Some(run) = &report.deploy_run {
        println!(
            "{} Deploy run {} {}",
            check(),
            run.id.to_string().accent(),
            run.conclusion.as_deref().unwrap_or("completed").muted()
        );
    }
    for warning in &report.warnings {
        eprintln!("{} {}", cross(), warning.warn());
    }
}
