//! Baseline tag selection
//!
//! Decides which existing tag the next release is computed from.

use crate::error::{Error, Result};
use crate::platform::HostingService;
use crate::types::{RepoRef, RepoTag};
use tracing::{debug, warn};

/// Where the selected tag came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSource {
    /// Given explicitly by the operator
    Override,
    /// Tag on the branch's head commit
    BranchTip,
    /// No tag on the branch yet; latest official release
    LatestRelease,
}

/// Inputs to the selection policy
#[derive(Debug, Clone, Default)]
pub struct TagHistory<'a> {
    /// Operator-supplied tag, used verbatim when non-empty
    pub user_override: Option<&'a str>,
    /// Head commit of the release branch
    pub branch_head: &'a str,
    /// Recent tags, newest first
    pub tags: &'a [RepoTag],
    /// `tags` narrowed to the invoking user's tags, when that filter applied
    pub user_tags: Option<&'a [RepoTag]>,
    /// Tag of the latest official release
    pub latest_release: Option<&'a str>,
}

/// Outcome of tag selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSelection {
    /// Selected tag name
    pub tag: String,
    /// Which rule produced it
    pub source: TagSource,
}

fn tag_on_commit<'t>(tags: &'t [RepoTag], sha: &str) -> Option<&'t RepoTag> {
    tags.iter().find(|t| t.commit_sha == sha)
}

/// Select the baseline tag for a branch
///
/// Override first, then the newest tag on the branch head (preferring the
/// user's own tags), then the latest official release.
pub fn select_old_tag(history: &TagHistory<'_>) -> Result<TagSelection> {
    if let Some(tag) = history.user_override.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(TagSelection {
            tag: tag.to_string(),
            source: TagSource::Override,
        });
    }

    let from_user_tags = history
        .user_tags
        .and_then(|tags| tag_on_commit(tags, history.branch_head));

    // The user filter never hides the branch's only tag
    let on_branch = from_user_tags.or_else(|| {
        let found = tag_on_commit(history.tags, history.branch_head);
        if found.is_some() && history.user_tags.is_some() {
            debug!("User tag filter would hide the branch tag; ignoring it");
        }
        found
    });

    if let Some(tag) = on_branch {
        return Ok(TagSelection {
            tag: tag.name.clone(),
            source: TagSource::BranchTip,
        });
    }

    debug!("No tag on branch head {}", history.branch_head);

    history
        .latest_release
        .map(|tag| TagSelection {
            tag: tag.to_string(),
            source: TagSource::LatestRelease,
        })
        .ok_or_else(|| {
            Error::NoTagFound(
                "no tag on the branch head and no official release to start from".to_string(),
            )
        })
}

/// Narrow tags to those whose commit was authored by `user`
pub async fn filter_tags_by_user(
    platform: &dyn HostingService,
    repo: &RepoRef,
    tags: &[RepoTag],
    user: &str,
) -> Result<Vec<RepoTag>> {
    let mut filtered = Vec::new();
    for tag in tags {
        let author = platform.commit_author(repo, &tag.commit_sha).await?;
        if author.as_deref() == Some(user) {
            filtered.push(tag.clone());
        }
    }
    Ok(filtered)
}

/// Options for [`resolve_old_tag`]
#[derive(Debug, Clone, Copy)]
pub struct SelectOptions<'a> {
    /// Operator-supplied tag
    pub user_override: Option<&'a str>,
    /// Invoking user's login, if known
    pub acting_user: Option<&'a str>,
    /// Whether to prefer the invoking user's tags
    pub filter_by_user: bool,
    /// Number of recent tags and releases to inspect
    pub history_limit: u8,
}

/// Gather tag history from the platform and select the baseline tag
pub async fn resolve_old_tag(
    platform: &dyn HostingService,
    repo: &RepoRef,
    branch: &str,
    options: &SelectOptions<'_>,
) -> Result<TagSelection> {
    if let Some(tag) = options.user_override.filter(|t| !t.trim().is_empty()) {
        debug!("Using tag override {tag}");
        return select_old_tag(&TagHistory {
            user_override: Some(tag),
            ..TagHistory::default()
        });
    }

    let tags = platform.list_tags(repo, options.history_limit).await?;
    debug!(
        "Fetched {} tags: {:?}",
        tags.len(),
        tags.iter().map(|t| &t.name).collect::<Vec<_>>()
    );

    let user_tags = match options.acting_user.filter(|u| !u.is_empty()) {
        Some(user) if options.filter_by_user => {
            match filter_tags_by_user(platform, repo, &tags, user).await {
                Ok(filtered) => {
                    debug!("{} of {} tags authored by {user}", filtered.len(), tags.len());
                    Some(filtered)
                }
                Err(e) => {
                    warn!("Could not filter tags by user {user}, using all tags: {e}");
                    None
                }
            }
        }
        _ => None,
    };

    let branch_head = platform.branch_head(repo, branch).await?;

    let tag_on_branch = user_tags
        .as_deref()
        .and_then(|t| tag_on_commit(t, &branch_head))
        .or_else(|| tag_on_commit(&tags, &branch_head))
        .is_some();

    // Only needed when the branch head carries no tag
    let latest_release = if tag_on_branch {
        None
    } else {
        platform
            .list_releases(repo, options.history_limit)
            .await?
            .into_iter()
            .find(|r| r.is_official())
            .map(|r| r.tag_name)
    };

    select_old_tag(&TagHistory {
        user_override: None,
        branch_head: &branch_head,
        tags: &tags,
        user_tags: user_tags.as_deref(),
        latest_release: latest_release.as_deref(),
    })
}
