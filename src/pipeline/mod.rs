//! Two-phase release pipeline
//!
//! 1. Planning - select the baseline tag and compute the next one
//! 2. Execution - release, wait for the build, bump the deployment,
//!    dispatch the deploy and wait for it

mod execute;
mod plan;
mod progress;

pub use execute::{PipelineReport, execute_release_plan};
pub use plan::{
    PipelineContext, PipelineRequest, ReleasePlan, branch_user, create_release_plan,
    describe_plan, resolve_acting_user,
};
pub use progress::{NoopProgress, Phase, ProgressCallback};
