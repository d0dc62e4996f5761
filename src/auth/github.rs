//! GitHub authentication

use crate::auth::AuthSource;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// GitHub authentication configuration
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token was obtained from
    pub source: AuthSource,
}

/// Shape of `auth.yaml`
#[derive(Deserialize)]
struct AuthFile {
    auth: AuthSection,
}

#[derive(Deserialize)]
struct AuthSection {
    token: String,
}

/// Get GitHub authentication
///
/// Priority:
/// 1. gh CLI (`gh auth token`)
/// 2. `GITHUB_TOKEN` environment variable
/// 3. `GH_TOKEN` environment variable
/// 4. `auth.token` in the given credentials file
pub async fn get_github_auth(auth_file: Option<&Path>) -> Result<GitHubAuthConfig> {
    // Try gh CLI first
    if let Some(token) = get_gh_cli_token().await {
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::Cli,
        });
    }

    if let Some(token) = token_from_env() {
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::EnvVar,
        });
    }

    if let Some(path) = auth_file.filter(|p| p.exists()) {
        return Ok(GitHubAuthConfig {
            token: read_auth_file(path)?,
            source: AuthSource::File,
        });
    }

    Err(Error::Auth(
        "No GitHub authentication found. Run `gh auth login`, set GITHUB_TOKEN, or add auth.yaml"
            .to_string(),
    ))
}

/// Token from `GITHUB_TOKEN` or `GH_TOKEN`, ignoring empty values
pub fn token_from_env() -> Option<String> {
    ["GITHUB_TOKEN", "GH_TOKEN"]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty())
}

/// Read the token from an `auth.yaml` credentials file
pub fn read_auth_file(path: &Path) -> Result<String> {
    debug!("Reading credentials from {}", path.display());
    let raw = std::fs::read_to_string(path)?;
    let file: AuthFile = serde_yaml::from_str(&raw)
        .map_err(|e| Error::Auth(format!("cannot parse {}: {e}", path.display())))?;
    let token = file.auth.token.trim().to_string();
    if token.is_empty() {
        return Err(Error::Auth(format!("{} has an empty token", path.display())));
    }
    Ok(token)
}

async fn get_gh_cli_token() -> Option<String> {
    // Check gh is available
    Command::new("gh").arg("--version").output().await.ok()?;

    // Check authenticated
    let status = Command::new("gh")
        .args(["auth", "status"])
        .output()
        .await
        .ok()?;

    if !status.status.success() {
        return None;
    }

    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() { None } else { Some(token) }
}

/// Test GitHub authentication, returning the authenticated login
pub async fn test_github_auth(config: &GitHubAuthConfig, host: Option<String>) -> Result<String> {
    use crate::platform::{GitHubService, HostingService};

    let service = GitHubService::new(&config.token, host)?;
    service
        .current_user()
        .await
        .map_err(|e| Error::Auth(format!("Invalid token: {e}")))
}
