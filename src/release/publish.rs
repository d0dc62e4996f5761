//! Release creation on the source repository

use crate::error::Result;
use crate::platform::HostingService;
use crate::types::{PublishedRelease, ReleaseRecord, RepoRef};
use crate::version::Tag;
use tracing::info;

/// Describe the release for `tag` cut from `branch`
///
/// Release candidates are published as pre-releases.
pub fn build_release_record(tag: &Tag, branch: &str, body: &str) -> ReleaseRecord {
    ReleaseRecord {
        tag: tag.to_string(),
        target_branch: branch.to_string(),
        title: tag.to_string(),
        body: body.to_string(),
        is_prerelease: tag.is_release_candidate(),
    }
}

/// Create the release on the hosting platform
pub async fn publish_release(
    platform: &dyn HostingService,
    repo: &RepoRef,
    record: &ReleaseRecord,
) -> Result<PublishedRelease> {
    let release = platform.create_release(repo, record).await?;
    info!(
        "Created release {} on {repo} from {}",
        release.tag_name, record.target_branch
    );
    Ok(release)
}
