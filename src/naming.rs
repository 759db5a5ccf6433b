//! Slug resolution for file-store entries.
//!
//! Every entry in the file-based store (articles, authors, tags) is keyed by
//! its filename, verbatim. Leading numbers are part of the slug:
//!
//! - `budget-reply.mdoc` → slug="budget-reply"
//! - `5-things-to-know.mdoc` → slug="5-things-to-know"
//! - `voice-debate/index.mdoc` → slug taken from the directory name
//!
//! [`slugify`] produces the heading anchors in rendered HTML.

/// Lookup key for an entry name (a file stem or an `index` file's directory).
///
/// The name is used unchanged. Empty and hidden names have no slug.
pub fn entry_slug(name: &str) -> Option<&str> {
    (!name.is_empty() && !name.starts_with('.')).then_some(name)
}

/// Display title derived from a slug: dashes become spaces, first letter
/// capitalized. Used when an entry has no authored title.
pub fn title_from_slug(slug: &str) -> String {
    let spaced = slug.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

const MAX_SLUG_LEN: usize = 80;

/// Reduce arbitrary text to a URL-safe slug.
///
/// - Lowercases ASCII letters
/// - Replaces anything that is not an ASCII letter, digit or dash with a dash
/// - Collapses consecutive dashes and strips leading/trailing dashes
/// - Truncates to `MAX_SLUG_LEN` characters (breaks at last dash before limit)
pub fn slugify(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut prev_dash = true;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            collapsed.push(c.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            collapsed.push('-');
            prev_dash = true;
        }
    }
    let trimmed = collapsed.trim_end_matches('-');

    if trimmed.len() <= MAX_SLUG_LEN {
        trimmed.to_string()
    } else {
        let truncated = &trimmed[..MAX_SLUG_LEN];
        match truncated.rfind('-') {
            Some(pos) => truncated[..pos].to_string(),
            None => truncated.to_string(),
        }
    }
}
