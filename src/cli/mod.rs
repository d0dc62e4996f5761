//! CLI commands
//!
//! Command implementations for the `autodeployer` binary.

mod auth;
mod deploy;
mod next_tag;
mod progress;
pub mod style;

pub use auth::{run_auth_setup, run_auth_test};
pub use deploy::{DeployOptions, parse_input, run_deploy};
pub use next_tag::run_next_tag;
