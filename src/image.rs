//! Image reference normalization.
//!
//! Content records point at images in several shapes: a full URL from the
//! hosted CMS, a site-rooted path, a bare filename dropped next to an article,
//! or the `{ src: ... }` object the file-based editor writes for image fields.
//! Pages only ever see one shape: a single string that is either absolute or
//! rooted.
//!
//! Rules, in order:
//!
//! 1. absent / empty → `None`
//! 2. `http://…` or `https://…` → unchanged
//! 3. `/…` → unchanged
//! 4. anything else → `base` + reference
//! 5. `{ src }` → rules 1–4 applied to `src`
//!
//! Because every output falls under rule 2 or 3, normalizing is idempotent.

use serde::{Deserialize, Serialize};

/// An image reference as it appears in a content record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Path(String),
    Field { src: Option<String> },
}

impl ImageRef {
    /// The raw reference string, if any.
    pub fn src(&self) -> Option<&str> {
        match self {
            ImageRef::Path(path) => Some(path),
            ImageRef::Field { src } => src.as_deref(),
        }
    }
}

impl From<&str> for ImageRef {
    fn from(value: &str) -> Self {
        ImageRef::Path(value.to_string())
    }
}

/// Normalize an optional image reference against a base directory.
pub fn normalize_image(reference: Option<&ImageRef>, base: &str) -> Option<String> {
    reference
        .and_then(ImageRef::src)
        .and_then(|src| normalize_src(src, base))
}

/// Normalize a raw reference string against a base directory.
pub fn normalize_src(src: &str, base: &str) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }
    if is_absolute(src) || src.starts_with('/') {
        return Some(src.to_string());
    }
    Some(format!("{}{}", as_directory(base), src))
}

fn is_absolute(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

/// Treat `base` as a rooted directory: leading and trailing `/` supplied.
fn as_directory(base: &str) -> String {
    let trimmed = base.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}
