//! autodeployer - release candidates and deployment bumps for GitHub services
//!
//! Cuts a release candidate for a service repository, waits for its build,
//! bumps the image tag in the matching deployment repository on a dedicated
//! branch, and dispatches the deploy workflow for that branch.
//!
//! The crate is split into a small pure core and a GitHub-facing shell:
//!
//! - [`version`] - tag parsing and next-tag resolution
//! - [`release`] - baseline tag selection and release publishing
//! - [`deploy`] - manifest patching and deployment branches
//! - [`workflow`] - waiting on and dispatching GitHub Actions runs
//! - [`pipeline`] - planning and executing a full release
//! - [`platform`] - the [`platform::HostingService`] seam and its GitHub client

pub mod auth;
pub mod config;
pub mod deploy;
pub mod error;
pub mod pipeline;
pub mod platform;
pub mod release;
pub mod types;
pub mod version;
pub mod workflow;

pub use error::{Error, Result};
