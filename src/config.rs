//! Site configuration module.
//!
//! Handles loading, validating, and layering `broadsheet.toml`. Values are
//! resolved in three layers, later layers winning:
//!
//! ```text
//! stock defaults  →  broadsheet.toml  →  environment (GHOST_URL, GHOST_CONTENT_API_KEY)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! source = "file"              # "file" (local store) or "hosted" (Content API)
//! site_title = "The Broadsheet"
//! excerpt_length = 200         # Excerpt bound, in characters
//! words_per_minute = 200       # Reading speed for reading-time estimates
//!
//! [store]
//! content_dir = "content"
//! image_base = "/images/articles/"
//!
//! [hosted]
//! url = ""                     # overridden by GHOST_URL
//! key = ""                     # overridden by GHOST_CONTENT_API_KEY
//! api_version = "v5.0"
//! timeout_secs = 30
//! image_base = "/"
//!
//! [[categories]]
//! slug = "politics"
//! title = "Politics"
//! description = "..."
//! tag = "politics"             # omit to list every article
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! ## Hosted credentials
//!
//! The hosted adapter cannot do anything without a base URL and a Content API
//! key, so [`HostedConfig::credentials`] is strict: both must be present, the
//! key must be exactly 26 lowercase hex characters, and the URL must parse.
//! Any failure is a [`ConfigError`] raised before a single request is made.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

/// Default config filename, looked up in the working directory.
pub const CONFIG_FILE: &str = "broadsheet.toml";

pub const ENV_URL: &str = "GHOST_URL";
pub const ENV_KEY: &str = "GHOST_CONTENT_API_KEY";

static API_KEY_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{26}$").expect("key pattern is valid"));

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error(
        "hosted CMS configuration is missing: set GHOST_URL and GHOST_CONTENT_API_KEY (or [hosted] url and key). \
         Both come from the CMS admin panel under Settings > Integrations > Custom Integrations"
    )]
    MissingCredentials,
    #[error(
        "invalid GHOST_CONTENT_API_KEY format: the key must be exactly 26 lowercase hexadecimal characters \
         (got {length} characters)"
    )]
    InvalidApiKey { length: usize },
    #[error("invalid GHOST_URL format: {url} ({reason}); expected e.g. http://localhost:2368")]
    InvalidUrl { url: String, reason: String },
}

/// Which adapter serves content. Exactly one is active per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    File,
    Hosted,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::File => f.write_str("file"),
            SourceKind::Hosted => f.write_str("hosted"),
        }
    }
}

/// Site configuration loaded from `broadsheet.toml`.
///
/// All fields have defaults. Config files need only specify the values they
/// override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Active content adapter.
    pub source: SourceKind,
    /// Site name used in page titles and headers.
    pub site_title: String,
    /// Excerpt bound in characters of plain text.
    pub excerpt_length: usize,
    /// Reading speed for reading-time estimates.
    pub words_per_minute: u32,
    /// File-based store settings.
    pub store: StoreConfig,
    /// Hosted Content API settings.
    pub hosted: HostedConfig,
    /// Section pages shown in navigation.
    pub categories: Vec<CategoryConfig>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::File,
            site_title: "The Broadsheet".to_string(),
            excerpt_length: crate::text::DEFAULT_EXCERPT_LENGTH,
            words_per_minute: crate::text::WORDS_PER_MINUTE,
            store: StoreConfig::default(),
            hosted: HostedConfig::default(),
            categories: default_categories(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.excerpt_length == 0 {
            return Err(ConfigError::Validation(
                "excerpt_length must be greater than 0".into(),
            ));
        }
        if self.words_per_minute == 0 {
            return Err(ConfigError::Validation(
                "words_per_minute must be greater than 0".into(),
            ));
        }
        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.slug.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "categories.slug must not be empty".into(),
                ));
            }
            if !seen.insert(category.slug.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate category slug: {}",
                    category.slug
                )));
            }
        }
        Ok(())
    }

    /// Look up a category by slug, case-insensitively.
    pub fn category(&self, slug: &str) -> Option<&CategoryConfig> {
        self.categories
            .iter()
            .find(|c| c.slug.eq_ignore_ascii_case(slug))
    }

    /// Apply environment overrides for the hosted credentials.
    ///
    /// Takes a lookup function so tests never touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL).filter(|v| !v.trim().is_empty()) {
            self.hosted.url = url.trim().to_string();
        }
        if let Some(key) = lookup(ENV_KEY).filter(|v| !v.trim().is_empty()) {
            self.hosted.key = key.trim().to_string();
        }
    }
}

/// File-based store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Root of the content store (contains `articles/`, `authors/`, `tags/`).
    pub content_dir: String,
    /// Directory prefix for bare image filenames.
    pub image_base: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            content_dir: "content".to_string(),
            image_base: "/images/articles/".to_string(),
        }
    }
}

/// Hosted Content API settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostedConfig {
    /// Base URL of the CMS, e.g. `https://cms.example.com`.
    pub url: String,
    /// 26-character Content API key.
    pub key: String,
    /// Value of the `Accept-Version` header sent with every query.
    pub api_version: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Directory prefix for bare image filenames.
    pub image_base: String,
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            key: String::new(),
            api_version: "v5.0".to_string(),
            timeout_secs: 30,
            image_base: "/".to_string(),
        }
    }
}

// The key is a credential; keep it out of debug output.
impl std::fmt::Debug for HostedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedConfig")
            .field("url", &self.url)
            .field("has_key", &!self.key.is_empty())
            .field("key_length", &self.key.len())
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("image_base", &self.image_base)
            .finish()
    }
}

/// Validated hosted credentials.
#[derive(Clone)]
pub struct Credentials {
    pub url: Url,
    pub key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url.as_str())
            .field("key_length", &self.key.len())
            .finish()
    }
}

impl HostedConfig {
    /// Check presence and format of the URL and key.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let url = self.url.trim();
        let key = self.key.trim();
        if url.is_empty() || key.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        if !API_KEY_FORMAT.is_match(key) {
            return Err(ConfigError::InvalidApiKey {
                length: key.chars().count(),
            });
        }
        let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: url.to_string(),
                reason: "not a base URL".to_string(),
            });
        }
        Ok(Credentials {
            url: parsed,
            key: key.to_string(),
        })
    }
}

/// A section page: a title, blurb, and the tag whose articles it lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Tag slug to filter by. `None` lists every article.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

fn category(slug: &str, title: &str, description: &str, tag: Option<&str>) -> CategoryConfig {
    CategoryConfig {
        slug: slug.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        tag: tag.map(String::from),
    }
}

fn default_categories() -> Vec<CategoryConfig> {
    vec![
        category(
            "australia",
            "Australia",
            "In-depth coverage of Australian politics, society, and culture.",
            Some("australia"),
        ),
        category(
            "world",
            "World",
            "Global perspectives on international affairs and their impact on Australia.",
            Some("world"),
        ),
        category(
            "politics",
            "Politics",
            "Analysis and insights on Australian political landscape and policy debates.",
            Some("politics"),
        ),
        category(
            "feed",
            "Feed",
            "The latest stories and updates from across all categories.",
            None,
        ),
        category(
            "discover",
            "Discover",
            "A curated collection of interesting content from around the web.",
            Some("discover"),
        ),
    ]
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, arrays
///   included: a `[[categories]]` list in a config file replaces the stock one.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a `broadsheet.toml` path, without environment overrides.
///
/// Merges user values on top of stock defaults, rejects unknown keys, and
/// validates the result.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Load config and apply process environment overrides.
pub fn load_config_with_env(path: &Path) -> Result<SiteConfig, ConfigError> {
    let mut config = load_config(path)?;
    config.apply_env(|name| std::env::var(name).ok());
    Ok(config)
}

/// Returns a fully-commented stock `broadsheet.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Broadsheet Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Which content adapter serves pages: "file" (local content store) or
# "hosted" (headless CMS Content API). Exactly one is active at a time.
source = "file"

# Site name used in page titles and the masthead.
site_title = "The Broadsheet"

# Excerpt bound, in characters of plain text.
excerpt_length = 200

# Reading speed used for reading-time estimates.
words_per_minute = 200

# ---------------------------------------------------------------------------
# File-based content store
# ---------------------------------------------------------------------------
[store]
# Root directory holding articles/, authors/ and tags/.
content_dir = "content"

# Prefix for image fields that hold a bare filename.
image_base = "/images/articles/"

# ---------------------------------------------------------------------------
# Hosted Content API
# ---------------------------------------------------------------------------
[hosted]
# Base URL and Content API key. The environment variables GHOST_URL and
# GHOST_CONTENT_API_KEY take precedence over these values. The key is
# 26 lowercase hexadecimal characters.
url = ""
key = ""

# Accept-Version header sent with every query.
api_version = "v5.0"

# Per-request timeout in seconds.
timeout_secs = 30

# Prefix for image fields that hold a bare filename.
image_base = "/"

# ---------------------------------------------------------------------------
# Categories (section pages). Listing any replaces the whole default set.
# Omit `tag` to list every article.
# ---------------------------------------------------------------------------
[[categories]]
slug = "australia"
title = "Australia"
description = "In-depth coverage of Australian politics, society, and culture."
tag = "australia"

[[categories]]
slug = "world"
title = "World"
description = "Global perspectives on international affairs and their impact on Australia."
tag = "world"

[[categories]]
slug = "politics"
title = "Politics"
description = "Analysis and insights on Australian political landscape and policy debates."
tag = "politics"

[[categories]]
slug = "feed"
title = "Feed"
description = "The latest stories and updates from across all categories."

[[categories]]
slug = "discover"
title = "Discover"
description = "A curated collection of interesting content from around the web."
tag = "discover"
"##
}
