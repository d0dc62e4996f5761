//! Auth command - test and manage authentication

use crate::cli::style::{Stylize, check};
use anstream::println;
use autodeployer::auth::{get_github_auth, test_github_auth};
use autodeployer::config::{AUTH_FILE_NAME, Config};
use autodeployer::error::Result;
use std::path::{Path, PathBuf};

/// Run the auth test command
///
/// A missing config file is not an error here: the credentials file is then
/// looked up in the working directory and the public GitHub host is used.
pub async fn run_auth_test(config_path: Option<&Path>) -> Result<()> {
    let (auth_file, host) = match Config::load(config_path) {
        Ok(config) => (config.auth_file(), config.settings.host),
        Err(e) if config_path.is_none() => {
            tracing::debug!("No config loaded: {e}");
            (PathBuf::from(AUTH_FILE_NAME), None)
        }
        Err(e) => return Err(e),
    };

    println!("Testing GitHub authentication...");
    let auth = get_github_auth(Some(&auth_file)).await?;
    let username = test_github_auth(&auth, host.clone()).await?;
    println!("{} Authenticated as: {}", check(), username.accent());
    println!("Token source: {:?}", auth.source);
    if let Some(host) = host {
        println!("Host: {host}");
    }
    Ok(())
}

/// Run the auth setup command (show instructions)
pub fn run_auth_setup() {
    println!("{}", "GitHub Authentication Setup".emphasis());
    println!("===========================");
    println!();
    println!("Option 1: GitHub CLI (recommended)");
    println!("  Install: https://cli.github.com/");
    println!("  Run: gh auth login");
    println!();
    println!("Option 2: Environment variable");
    println!("  Set GITHUB_TOKEN or GH_TOKEN");
    println!();
    println!("Option 3: Credentials file");
    println!("  Create {AUTH_FILE_NAME} next to config.yaml:");
    println!("    auth:");
    println!("      token: <personal access token>");
    println!();
    println!("For GitHub Enterprise:");
    println!("  Set settings.host in config.yaml (or GH_HOST) to your instance hostname");
    println!();
    println!(
        "{}",
        "The token needs repo and workflow scopes on both the source and deployment repositories."
            .muted()
    );
}
