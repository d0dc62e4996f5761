//! Hosting service factory
//!
//! Creates the hosting service from configuration.

use crate::auth::get_github_auth;
use crate::config::Config;
use crate::error::Result;
use crate::platform::{GitHubService, HostingService};
use tracing::debug;

/// Create a hosting service from configuration
///
/// Handles authentication and client construction.
pub async fn create_hosting_service(config: &Config) -> Result<Box<dyn HostingService>> {
    let auth_file = config.auth_file();
    let auth = get_github_auth(Some(&auth_file)).await?;
    debug!("Using GitHub token from {:?}", auth.source);

    Ok(Box::new(GitHubService::new(
        &auth.token,
        config.settings.host.clone(),
    )?))
}
