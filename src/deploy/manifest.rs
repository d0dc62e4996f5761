//! Tag substitution in manifest text
//!
//! Works on raw text rather than parsed YAML, so comments, ordering and even
//! malformed documents survive a bump untouched.

/// Characters that may not directly precede a tag token
const fn continues_before(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

/// Characters that may not directly follow a tag token
const fn continues_after(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+')
}

/// Result of a substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPatch {
    /// Patched content
    pub content: String,
    /// Number of tokens replaced
    pub replacements: usize,
}

impl ManifestPatch {
    /// Whether the content changed
    pub const fn is_noop(&self) -> bool {
        self.replacements == 0
    }
}

/// Replace every whole-token occurrence of `old_tag` with `new_tag`
///
/// `1.2.3` matches in `tag: 1.2.3` and `svc:1.2.3` but not inside `1.2.30`,
/// `11.2.3` or `1.2.3-rc1`.
pub fn replace_tag(content: &str, old_tag: &str, new_tag: &str) -> ManifestPatch {
    if old_tag.is_empty() {
        return ManifestPatch {
            content: content.to_string(),
            replacements: 0,
        };
    }

    let mut out = String::with_capacity(content.len());
    let mut replacements = 0;
    let mut copied_to = 0;

    for (start, _) in content.match_indices(old_tag) {
        let end = start + old_tag.len();
        let before = content[..start].chars().next_back();
        let after = content[end..].chars().next();

        if before.is_some_and(continues_before) || after.is_some_and(continues_after) {
            continue;
        }

        out.push_str(&content[copied_to..start]);
        out.push_str(new_tag);
        copied_to = end;
        replacements += 1;
    }
    out.push_str(&content[copied_to..]);

    ManifestPatch {
        content: out,
        replacements,
    }
}

/// Convenience wrapper returning only the patched text
pub fn find_and_replace_tag(content: &str, old_tag: &str, new_tag: &str) -> String {
    replace_tag(content, old_tag, new_tag).content
}
