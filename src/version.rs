//! Release versions and next-tag resolution
//!
//! Tags follow `MAJOR.MINOR.PATCH[-rcN]`. Parsing happens once, at the
//! boundary, so the resolver only ever sees well-formed values.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const RC_SEPARATOR: &str = "-rc";

/// A validated release tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    major: u64,
    minor: u64,
    patch: u64,
    rc: Option<u64>,
}

impl Tag {
    /// Build a tag from its components; `rc` must be positive when present
    pub fn new(major: u64, minor: u64, patch: u64, rc: Option<u64>) -> Result<Self> {
        if rc == Some(0) {
            return Err(Error::InvalidTagFormat(format!(
                "{major}.{minor}.{patch}-rc0: release candidate numbers start at 1"
            )));
        }
        Ok(Self {
            major,
            minor,
            patch,
            rc,
        })
    }

    /// Major component
    pub const fn major(&self) -> u64 {
        self.major
    }

    /// Minor component
    pub const fn minor(&self) -> u64 {
        self.minor
    }

    /// Patch component
    pub const fn patch(&self) -> u64 {
        self.patch
    }

    /// Release candidate number, if any
    pub const fn rc(&self) -> Option<u64> {
        self.rc
    }

    /// Whether this tag carries an `-rcN` suffix
    pub const fn is_release_candidate(&self) -> bool {
        self.rc.is_some()
    }

    /// The version this tag is a candidate for (suffix stripped)
    #[must_use]
    pub const fn target_version(&self) -> Self {
        Self { rc: None, ..*self }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(rc) = self.rc {
            write!(f, "{RC_SEPARATOR}{rc}")?;
        }
        Ok(())
    }
}

fn parse_component(raw: &str, what: &str, tag: &str) -> Result<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidTagFormat(format!(
            "{tag}: {what} component '{raw}' is not a number"
        )));
    }
    // Leading zeros would not survive Display, so the tag could not be found
    // verbatim in a manifest
    if raw.len() > 1 && raw.starts_with('0') {
        return Err(Error::InvalidTagFormat(format!(
            "{tag}: {what} component '{raw}' has a leading zero"
        )));
    }
    raw.parse()
        .map_err(|e| Error::InvalidTagFormat(format!("{tag}: {what} component '{raw}': {e}")))
}

impl FromStr for Tag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (version, rc) = match trimmed.split_once(RC_SEPARATOR) {
            Some((version, rc)) => (version, Some(parse_component(rc, "rc", trimmed)?)),
            None => (trimmed, None),
        };

        let parts: Vec<&str> = version.split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(Error::InvalidTagFormat(format!(
                "{trimmed}: expected MAJOR.MINOR.PATCH, found {} component(s)",
                parts.len()
            )));
        };

        Self::new(
            parse_component(major, "major", trimmed)?,
            parse_component(minor, "minor", trimmed)?,
            parse_component(patch, "patch", trimmed)?,
            rc,
        )
    }
}

/// Kind of version change requested for a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeClass {
    /// Next release candidate (patch level)
    #[default]
    Minor,
    /// Major version bump
    Major,
    /// Breaking change bump
    Breaking,
}

impl fmt::Display for ChangeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Breaking => "breaking",
        };
        f.write_str(name)
    }
}

impl FromStr for ChangeClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minor" => Ok(Self::Minor),
            "major" => Ok(Self::Major),
            "breaking" => Ok(Self::Breaking),
            other => Err(Error::Parse(format!(
                "unknown change class '{other}' (expected minor, major or breaking)"
            ))),
        }
    }
}

/// Compute the tag that follows `old` for the given change class
///
/// `Minor` bumps the release candidate when `old` already is one, otherwise it
/// increments the patch component and starts at `-rc1`. Only the last numeric
/// component moves: `1.0.9` becomes `1.0.10-rc1`.
pub fn resolve_next_tag(old: &Tag, change: ChangeClass) -> Result<Tag> {
    match change {
        ChangeClass::Minor => {
            let overflow = || Error::InvalidTagFormat(format!("{old}: component overflow"));
            match old.rc {
                Some(rc) => Tag::new(
                    old.major,
                    old.minor,
                    old.patch,
                    Some(rc.checked_add(1).ok_or_else(overflow)?),
                ),
                None => Tag::new(
                    old.major,
                    old.minor,
                    old.patch.checked_add(1).ok_or_else(overflow)?,
                    Some(1),
                ),
            }
        }
        ChangeClass::Major | ChangeClass::Breaking => Err(Error::Unimplemented(change)),
    }
}
