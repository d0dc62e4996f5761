//! Repository spec parsing
//!
//! Accepts a bare repository name, `owner/name`, or a GitHub remote URL.

use crate::error::{Error, Result};
use crate::types::RepoRef;
use regex::Regex;
use std::env;
use std::sync::OnceLock;

/// Whether a hostname belongs to GitHub (or the configured Enterprise host)
pub fn is_github_host(hostname: &str, enterprise_host: Option<&str>) -> bool {
    let gh_host = env::var("GH_HOST").ok();

    hostname == "github.com"
        || hostname.ends_with(".github.com")
        || enterprise_host.is_some_and(|h| hostname == h)
        || gh_host.as_ref().is_some_and(|h| hostname == *h)
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("hardcoded regex is valid"))
}

fn url_patterns() -> &'static (Regex, Regex) {
    static PATTERNS: OnceLock<(Regex, Regex)> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        (
            Regex::new(r"^git@[^:]+:(.+?)(?:\.git)?/?$").expect("hardcoded regex is valid"),
            Regex::new(r"^https?://[^/]+/(.+?)(?:\.git)?/?$").expect("hardcoded regex is valid"),
        )
    })
}

/// Parse a repository spec into a [`RepoRef`]
///
/// Bare names take `default_owner`. URLs must point at a GitHub host.
pub fn parse_repo_spec(
    spec: &str,
    default_owner: Option<&str>,
    enterprise_host: Option<&str>,
) -> Result<RepoRef> {
    let spec = spec.trim();

    let path = if spec.starts_with("git@") || spec.contains("://") {
        let hostname = extract_hostname(spec)
            .ok_or_else(|| Error::Parse(format!("cannot parse remote URL: {spec}")))?;
        if !is_github_host(&hostname, enterprise_host) {
            return Err(Error::Parse(format!("{hostname} is not a GitHub host")));
        }

        let (re_ssh, re_https) = url_patterns();
        re_ssh
            .captures(spec)
            .or_else(|| re_https.captures(spec))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| Error::Parse(format!("cannot parse remote URL: {spec}")))?
    } else {
        spec.to_string()
    };

    let parts: Vec<&str> = path.split('/').collect();
    let (owner, name) = match parts.as_slice() {
        [name] => {
            let owner = default_owner.filter(|o| !o.is_empty()).ok_or_else(|| {
                Error::Parse(format!(
                    "repository '{name}' has no owner; use owner/{name} or set settings.owner"
                ))
            })?;
            (owner, *name)
        }
        [owner, name] => (*owner, *name),
        _ => return Err(Error::Parse(format!("invalid repository path: {path}"))),
    };

    for part in [owner, name] {
        if !name_pattern().is_match(part) {
            return Err(Error::Parse(format!("invalid repository path: {path}")));
        }
    }

    Ok(RepoRef::new(owner, name))
}

fn extract_hostname(url: &str) -> Option<String> {
    // SSH format
    if url.starts_with("git@") {
        return url
            .strip_prefix("git@")
            .and_then(|s| s.split(':').next())
            .map(ToString::to_string);
    }

    // HTTPS format
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
}
