//! Authentication for GitHub
//!
//! Supports the gh CLI, environment variables and an `auth.yaml` file.

mod github;

pub use github::{
    GitHubAuthConfig, get_github_auth, read_auth_file, test_github_auth, token_from_env,
};

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from the gh CLI
    Cli,
    /// Token from environment variable
    EnvVar,
    /// Token from a credentials file
    File,
}
