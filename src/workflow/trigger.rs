//! Workflow dispatch

use crate::error::Result;
use crate::platform::HostingService;
use crate::types::DispatchTarget;
use tracing::info;

/// Dispatch `workflow` (a workflow file name) on the target ref
///
/// Fire-and-forget: returns once GitHub accepted the event. Whether a failure
/// aborts the pipeline is up to the caller.
pub async fn trigger_workflow(
    platform: &dyn HostingService,
    target: &DispatchTarget,
    workflow: &str,
    inputs: &serde_json::Value,
) -> Result<()> {
    platform
        .dispatch_workflow(&target.repo, workflow, &target.ref_name, inputs)
        .await?;
    info!(
        "Dispatched {workflow} on {}@{}",
        target.repo, target.ref_name
    );
    Ok(())
}
