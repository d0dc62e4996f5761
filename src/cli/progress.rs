//! Shared CLI progress callback with styled output and spinners

use crate::cli::style::{Stylize, check, link, poll_spinner};
use anstream::{eprintln, println};
use async_trait::async_trait;
use autodeployer::error::Error;
use autodeployer::pipeline::{Phase, ProgressCallback};
use autodeployer::types::{DeploymentBranch, PublishedRelease, WorkflowTarget};
use autodeployer::workflow::WorkflowPoll;
use indicatif::ProgressBar;
use std::sync::Mutex;

/// CLI progress callback that prints to stdout with styled output
///
/// Workflow polling is shown on a single spinner line that is replaced by a
/// summary once the run completes.
pub struct CliProgress {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    /// Create a progress reporter with no active spinner
    pub const fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn finish_spinner(&self) {
        if let Some(spinner) = self.spinner.lock().ok().and_then(|mut guard| guard.take()) {
            spinner.finish_and_clear();
        }
    }

    fn update_spinner(&self, message: String) {
        let Ok(mut guard) = self.spinner.lock() else {
            return;
        };
        let spinner = guard.get_or_insert_with(poll_spinner);
        spinner.set_message(message);
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        self.finish_spinner();
        match phase {
            Phase::Complete => println!("{} {}", check(), phase.to_string().success()),
            _ => println!("{}...", phase.to_string().emphasis()),
        }
    }

    async fn on_workflow_poll(&self, target: &WorkflowTarget, poll: &WorkflowPoll) {
        let Some(run) = &poll.run else {
            self.update_spinner(format!(
                "No workflow run on {target} yet ({}/{})",
                poll.attempt, poll.max_attempts
            ));
            return;
        };

        if run.status.is_completed() {
            self.finish_spinner();
            let conclusion = run.conclusion.as_deref().unwrap_or("unknown");
            let conclusion = if conclusion == "success" {
                conclusion.success().to_string()
            } else {
                conclusion.warn().for_stdout().to_string()
            };
            println!(
                "  {} Run {} on {} finished: {conclusion}",
                check(),
                run.id.to_string().accent(),
                target.to_string().emphasis()
            );
            println!("    {}", link(&run.html_url));
        } else {
            self.update_spinner(format!(
                "Run {} on {target} is {} ({}/{}, {}s)",
                run.id,
                run.status,
                poll.attempt,
                poll.max_attempts,
                poll.elapsed.as_secs()
            ));
        }
    }

    async fn on_release_created(&self, release: &PublishedRelease) {
        println!(
            "  {} Created release {}",
            check(),
            release.tag_name.accent()
        );
        println!("    {}", link(&release.html_url));
    }

    async fn on_branch_ready(&self, branch: &DeploymentBranch) {
        let action = if branch.created { "Created" } else { "Reusing" };
        println!(
            "  {} {action} branch {} for {}",
            check(),
            branch.name().accent(),
            branch.source_repo.emphasis()
        );
        if branch.replacements == 0 {
            println!("    {}", "manifest already up to date".muted());
        } else {
            println!(
                "    {}",
                format!("{} occurrence(s) replaced", branch.replacements).muted()
            );
        }
    }

    async fn on_error(&self, err: &Error) {
        self.finish_spinner();
        eprintln!("{}: {}", "error".error(), err);
    }

    async fn on_message(&self, message: &str) {
        self.finish_spinner();
        println!("{message}");
    }
}
