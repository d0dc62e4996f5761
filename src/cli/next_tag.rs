//! Next-tag command - print the tag that follows a given one

use anstream::println;
use autodeployer::error::Result;
use autodeployer::version::{ChangeClass, Tag, resolve_next_tag};

/// Run the next-tag command
pub fn run_next_tag(tag: &str, change: ChangeClass) -> Result<()> {
    let current: Tag = tag.parse()?;
    let next = resolve_next_tag(&current, change)?;
    println!("{next}");
    Ok(())
}
