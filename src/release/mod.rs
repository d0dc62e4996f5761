//! Release side of the pipeline
//!
//! 1. Selection - find the tag the branch was last released from
//! 2. Publishing - create the release for the next tag

mod publish;
mod select;

pub use publish::{build_release_record, publish_release};
pub use select::{
    SelectOptions, TagHistory, TagSelection, TagSource, filter_tags_by_user, resolve_old_tag,
    select_old_tag,
};
