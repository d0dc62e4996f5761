//! Deployment repository bumps

mod branch;
mod bump;
mod manifest;

pub use branch::{branch_ref, deployment_branch_name};
pub use bump::{BumpRequest, bump_commit_message, bump_deployment};
pub use manifest::{ManifestPatch, find_and_replace_tag, replace_tag};
