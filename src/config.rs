//! Configuration file loading
//!
//! `config.yaml` holds global settings and the mapping from source
//! repositories to the deployment repositories that reference them.

use crate::error::{Error, Result};
use crate::platform::parse_repo_spec;
use crate::types::DeploymentTarget;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Config file name looked up in the working and config directories
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Credentials file name, expected next to the config file
pub const AUTH_FILE_NAME: &str = "auth.yaml";

const APP_DIR: &str = "autodeployer";

/// Global settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default repository owner for bare repository names
    pub owner: Option<String>,
    /// GitHub Enterprise hostname (`None` for github.com)
    pub host: Option<String>,
    /// Polls before a workflow wait gives up
    pub workflow_retry_limit: u32,
    /// Seconds between polls
    pub workflow_retry_wait_seconds: u64,
    /// Seconds to wait after creating a release before polling its build
    pub release_settle_seconds: u64,
    /// Default workflow file dispatched on the deployment branch
    pub deploy_workflow: String,
    /// Prefer tags authored by the invoking user
    pub filter_tags_by_user: bool,
    /// Prefix deployment branch names with the invoking user's login
    pub include_user_in_branch: bool,
    /// Treat a completed run with a non-success conclusion as a failure
    pub require_successful_conclusion: bool,
    /// Abort when the deploy workflow cannot be dispatched
    pub fail_on_dispatch_error: bool,
    /// Number of recent tags inspected when selecting the baseline
    pub tag_history_limit: u8,
    /// Body of created releases
    pub release_body: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            owner: None,
            host: None,
            workflow_retry_limit: 60,
            workflow_retry_wait_seconds: 10,
            release_settle_seconds: 10,
            deploy_workflow: "deploy.yml".to_string(),
            filter_tags_by_user: true,
            include_user_in_branch: true,
            require_successful_conclusion: false,
            fail_on_dispatch_error: false,
            tag_history_limit: 30,
            release_body: "Release created using autodeployer".to_string(),
        }
    }
}

impl Settings {
    /// Interval between workflow polls
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.workflow_retry_wait_seconds)
    }

    /// Delay after release creation
    pub const fn release_settle_delay(&self) -> Duration {
        Duration::from_secs(self.release_settle_seconds)
    }
}

/// Per source repository entry under a deployment repository
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeploymentEntry {
    /// Manifest path inside the deployment repository
    pub staging_config_path: String,
    /// Workflow override for this service
    #[serde(default)]
    pub deploy_workflow: Option<String>,
}

/// Parsed configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,
    /// Deployment repository → source repository → entry
    #[serde(default)]
    pub deployment_repos: BTreeMap<String, BTreeMap<String, DeploymentEntry>>,
    /// File the config was read from
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Parse configuration from YAML text
    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `explicit`, or the first default location found
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!("{} does not exist", path.display())));
                }
                path.to_path_buf()
            }
            None => default_config_paths()
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| {
                    Error::Config(format!(
                        "no {CONFIG_FILE_NAME} found in the current directory or {}",
                        user_config_dir().map_or_else(
                            || "the user config directory".to_string(),
                            |d| d.display().to_string()
                        )
                    ))
                })?,
        };

        debug!("Loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(&path)?;
        let mut config = Self::from_yaml(&raw)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.source_path = Some(path);
        Ok(config)
    }

    /// Credentials file next to the loaded config (or in the working directory)
    pub fn auth_file(&self) -> PathBuf {
        self.source_path
            .as_deref()
            .and_then(Path::parent)
            .map_or_else(|| PathBuf::from(AUTH_FILE_NAME), |dir| dir.join(AUTH_FILE_NAME))
    }

    /// Find the deployment target that lists `source_repo`
    ///
    /// Deployment repositories are searched in name order, so a source listed
    /// twice always resolves to the same one.
    pub fn deployment_target(&self, source_repo: &str) -> Result<DeploymentTarget> {
        let (deployment_repo, entry) = self
            .deployment_repos
            .iter()
            .find_map(|(deployment_repo, sources)| {
                sources.get(source_repo).map(|entry| (deployment_repo, entry))
            })
            .ok_or_else(|| {
                Error::Config(format!("no deployment repository configured for {source_repo}"))
            })?;

        debug!("Found deployment repo {deployment_repo} for {source_repo}");

        Ok(DeploymentTarget {
            repo: parse_repo_spec(
                deployment_repo,
                self.settings.owner.as_deref(),
                self.settings.host.as_deref(),
            )?,
            manifest_path: entry.staging_config_path.clone(),
            workflow: entry
                .deploy_workflow
                .clone()
                .unwrap_or_else(|| self.settings.deploy_workflow.clone()),
        })
    }

    fn validate(&self) -> Result<()> {
        if self.settings.workflow_retry_limit == 0 {
            return Err(Error::Config(
                "settings.workflow_retry_limit must be at least 1".to_string(),
            ));
        }
        if self.settings.tag_history_limit == 0 || self.settings.tag_history_limit > 100 {
            return Err(Error::Config(
                "settings.tag_history_limit must be between 1 and 100".to_string(),
            ));
        }
        for (deployment_repo, sources) in &self.deployment_repos {
            for (source, entry) in sources {
                if entry.staging_config_path.trim().is_empty() {
                    return Err(Error::Config(format!(
                        "{deployment_repo}.{source}: staging-config-path is empty"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR))
}

/// Default config locations, in lookup order
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = user_config_dir() {
        paths.push(dir.join(CONFIG_FILE_NAME));
    }
    paths
}
