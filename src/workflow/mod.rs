//! GitHub Actions workflows: waiting on runs and dispatching new ones

mod trigger;
mod wait;

pub use trigger::trigger_workflow;
pub use wait::{PollPolicy, WorkflowPoll, wait_for_completion};
