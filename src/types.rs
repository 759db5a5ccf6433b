//! Normalized view models shared by both content adapters.
//!
//! These are the only shapes page code ever sees. Field names serialize in
//! camelCase (`publishedAt`, `readingTime`, `featureImage`, `profileImage`)
//! and must stay identical whichever adapter produced them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const UNTITLED_TAG: &str = "Untitled Tag";

/// A render-ready article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub slug: String,
    pub title: String,
    /// Rendered, sanitized HTML.
    pub content: String,
    /// Plain-text summary, bounded, never markup.
    pub excerpt: String,
    pub published_at: DateTime<Utc>,
    /// Whole minutes, at least 1.
    pub reading_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_image: Option<String>,
    pub author: Author,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Outline of the body: `h2` sections with their `h3` subsections.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
}

impl Article {
    pub fn has_tag(&self, tag_slug: &str) -> bool {
        self.tags.iter().any(|t| t.slug == tag_slug)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl Author {
    /// Placeholder used whenever an author relationship cannot be resolved.
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_AUTHOR.to_string(),
            bio: String::new(),
            profile_image: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_AUTHOR
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Lookup key for by-tag queries.
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A level-2 heading in an article body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsections: Vec<Subsection>,
}

/// A level-3 heading nested under a [`Section`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsection {
    pub id: String,
    pub title: String,
}

/// First non-empty value after trimming, or `fallback`.
///
/// ```text
/// author name: or_fallback(&[entry.name], "Unknown Author")
/// excerpt:     or_fallback(&[custom_excerpt, excerpt], "")
/// ```
pub fn or_fallback(sources: &[Option<&str>], fallback: &str) -> String {
    sources
        .iter()
        .filter_map(|opt| opt.map(str::trim).filter(|s| !s.is_empty()))
        .next()
        .unwrap_or(fallback)
        .to_string()
}

/// Parse a publication timestamp, accepting RFC 3339 or a bare `YYYY-MM-DD`
/// (midnight UTC).
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Resolve a publication timestamp, falling back to now when the record has
/// none or it does not parse.
pub fn published_at_or_now(raw: Option<&str>, slug: &str) -> DateTime<Utc> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => parse_published_at(value).unwrap_or_else(|| {
            tracing::warn!(slug, value, "unparseable publish date, using current time");
            Utc::now()
        }),
        None => Utc::now(),
    }
}
