//! Deployment branch naming

use crate::version::Tag;

/// Branch name for bumping `source_repo` to the version `new_tag` targets
///
/// The rc suffix is dropped, so every candidate of one version lands on the
/// same branch. An empty user is left out rather than leaving a dangling `-`.
pub fn deployment_branch_name(acting_user: &str, source_repo: &str, new_tag: &Tag) -> String {
    let future = new_tag.target_version();
    let user = acting_user.trim();
    if user.is_empty() {
        format!("{source_repo}-bump-{future}")
    } else {
        format!("{user}-{source_repo}-bump-{future}")
    }
}

/// Fully-qualified ref for a branch name
pub fn branch_ref(branch: &str) -> String {
    format!("refs/heads/{branch}")
}
