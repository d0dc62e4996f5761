//! Credential lookup tests
//!
//! Environment variables are process-global, so every test touching them is
//! serialized.

#![allow(unsafe_code)]

use autodeployer::auth::{read_auth_file, token_from_env};
use autodeployer::config::{AUTH_FILE_NAME, Config};
use serial_test::serial;
use std::env;

fn clear_token_env() {
    // SAFETY: tests touching the environment are serialized
    unsafe {
        env::remove_var("GITHUB_TOKEN");
        env::remove_var("GH_TOKEN");
    }
}

fn set_env(key: &str, value: &str) {
    // SAFETY: tests touching the environment are serialized
    unsafe { env::set_var(key, value) }
}

#[test]
#[serial]
fn test_github_token_preferred_over_gh_token() {
    clear_token_env();
    set_env("GITHUB_TOKEN", "from-github-token");
    set_env("GH_TOKEN", "from-gh-token");

    assert_eq!(token_from_env().as_deref(), Some("from-github-token"));
    clear_token_env();
}

#[test]
#[serial]
fn test_blank_env_token_is_skipped() {
    clear_token_env();
    set_env("GITHUB_TOKEN", "   ");
    set_env("GH_TOKEN", "fallback");

    assert_eq!(token_from_env().as_deref(), Some("fallback"));
    clear_token_env();
}

#[test]
#[serial]
fn test_no_env_token() {
    clear_token_env();
    assert!(token_from_env().is_none());
}

#[test]
fn test_auth_file_next_to_loaded_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(&config_path, "settings:\n  owner: acme\n").unwrap();
    std::fs::write(
        dir.path().join(AUTH_FILE_NAME),
        "auth:\n  token: ghp_from_file\n",
    )
    .unwrap();

    let config = Config::load(Some(&config_path)).unwrap();

    assert_eq!(config.auth_file(), dir.path().join(AUTH_FILE_NAME));
    assert_eq!(read_auth_file(&config.auth_file()).unwrap(), "ghp_from_file");
}

#[test]
fn test_auth_file_with_empty_token_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(AUTH_FILE_NAME);
    std::fs::write(&path, "auth:\n  token: \"\"\n").unwrap();

    assert!(read_auth_file(&path).is_err());
}
