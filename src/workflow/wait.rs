//! Polling a workflow until it stops running

use crate::error::{Error, Result};
use crate::pipeline::ProgressCallback;
use crate::platform::HostingService;
use crate::types::{WorkflowRun, WorkflowTarget};
use chrono::TimeDelta;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// How long and how often to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between polls
    pub interval: Duration,
    /// Polls before giving up
    pub max_attempts: u32,
    /// Fail when the completed run's conclusion is not `success`
    pub require_success: bool,
}

/// One observation made while waiting
#[derive(Debug, Clone)]
pub struct WorkflowPoll {
    /// 1-based poll number
    pub attempt: u32,
    /// Poll budget
    pub max_attempts: u32,
    /// Latest run, if any exists yet
    pub run: Option<WorkflowRun>,
    /// Time since waiting started
    pub elapsed: Duration,
}

/// Local and GitHub clocks may disagree by this much
const CLOCK_SKEW_SECS: i64 = 30;

/// Whether `run` may have been started before `target.not_before`
fn predates(run: &WorkflowRun, target: &WorkflowTarget) -> bool {
    match (run.created_at, target.not_before) {
        (Some(created), Some(not_before)) => {
            created < not_before - TimeDelta::seconds(CLOCK_SKEW_SECS)
        }
        _ => false,
    }
}

/// Poll the most recent run for `target` until its status is `completed`
///
/// Any other status, including unknown ones and "no run yet", keeps polling.
/// A run older than `target.not_before` belongs to an earlier release and
/// counts as "no run yet".
/// `completed` only means the run stopped: unless `require_success` is set, a
/// failed run is returned like a successful one (with a warning logged).
pub async fn wait_for_completion(
    platform: &dyn HostingService,
    target: &WorkflowTarget,
    policy: &PollPolicy,
    progress: &dyn ProgressCallback,
) -> Result<WorkflowRun> {
    let started = Instant::now();

    for attempt in 1..=policy.max_attempts {
        let run = platform
            .latest_workflow_run(&target.repo, target.branch.as_deref())
            .await?
            .filter(|run| {
                let stale = predates(run, target);
                if stale {
                    debug!("Ignoring workflow run {} on {target}: created before the wait", run.id);
                }
                !stale
            });

        let poll = WorkflowPoll {
            attempt,
            max_attempts: policy.max_attempts,
            run,
            elapsed: started.elapsed(),
        };
        progress.on_workflow_poll(target, &poll).await;

        match poll.run {
            Some(run) if run.status.is_completed() => {
                debug!("Workflow run {} on {target} completed after {attempt} poll(s)", run.id);
                return check_conclusion(run, policy);
            }
            Some(run) => debug!("Workflow run {} on {target} is {}", run.id, run.status),
            None => debug!("No workflow run on {target} yet"),
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(Error::TimedOut {
        target: target.to_string(),
        attempts: policy.max_attempts,
    })
}

fn check_conclusion(run: WorkflowRun, policy: &PollPolicy) -> Result<WorkflowRun> {
    match run.conclusion.as_deref() {
        Some("success") => Ok(run),
        conclusion => {
            let conclusion = conclusion.unwrap_or("unknown").to_string();
            if policy.require_success {
                return Err(Error::WorkflowFailed {
                    run_id: run.id,
                    conclusion,
                });
            }
            warn!(
                "Workflow run {} completed with conclusion '{conclusion}'; continuing anyway",
                run.id
            );
            Ok(run)
        }
    }
}
