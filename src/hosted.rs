//! Hosted Content API adapter.
//!
//! Reads published posts from a Ghost-compatible Content API over HTTP and
//! projects them onto the same [`Article`] view model the file store
//! produces.
//!
//! ## Failure model
//!
//! Construction is the only fatal step: [`HostedClient::new`] validates the
//! base URL and key and returns a [`ConfigError`] before any request is made.
//! After that, every query is non-fatal. Transport errors, bad statuses and
//! undecodable bodies are logged with the operation, its key, the base URL
//! and the key's length (never the key), then surface as an empty list or
//! `None`.
//!
//! ## Requests
//!
//! ```text
//! probe       GET {url}/ghost/api/v3/content/posts/?key=…          Accept: application/json
//! list        GET {url}/ghost/api/content/posts/?key=…&include=tags,authors[&limit&page&order&filter]
//! by slug     GET {url}/ghost/api/content/posts/slug/{slug}/?key=…&include=tags,authors
//! ```
//!
//! Content queries send `Accept-Version` from config (`v5.0` by default).
//! [`HostedClient::get_posts`] probes the API before the real query and
//! returns nothing when the probe fails.

use crate::config::{ConfigError, Credentials, HostedConfig, SiteConfig};
use crate::image::normalize_src;
use crate::markup::outline_html;
use crate::naming::{slugify, title_from_slug};
use crate::text::{DEFAULT_EXCERPT_LENGTH, WORDS_PER_MINUTE, generate_excerpt, reading_time_at};
use crate::types::{
    Article, Author, Tag, UNKNOWN_AUTHOR, UNTITLED_TAG, or_fallback, published_at_or_now,
};
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

const INCLUDE: &str = "tags,authors";

#[derive(Error, Debug)]
pub enum HostedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },
    #[error("Response from {url} is not valid JSON: {reason}")]
    Decode { url: String, reason: String },
    #[error("Cannot build request paths under {0}")]
    BaseUrl(String),
}

/// Pass-through browse parameters. Unset fields are omitted from the query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BrowseOptions {
    /// Page size, or `"all"`.
    pub limit: Option<String>,
    pub page: Option<u32>,
    pub order: Option<String>,
    /// NQL filter expression, e.g. `tag:politics`.
    pub filter: Option<String>,
}

impl BrowseOptions {
    pub fn limit(mut self, limit: impl ToString) -> Self {
        self.limit = Some(limit.to_string());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = &self.limit {
            pairs.push(("limit", limit.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(order) = &self.order {
            pairs.push(("order", order.clone()));
        }
        if let Some(filter) = &self.filter {
            pairs.push(("filter", filter.clone()));
        }
        pairs
    }
}

/// A post as the Content API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub custom_excerpt: Option<String>,
    #[serde(default)]
    pub feature_image: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub reading_time: Option<u32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<PostTag>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authors: Vec<PostAuthor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostTag {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostAuthor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct PostsEnvelope {
    #[serde(default, deserialize_with = "null_as_empty")]
    posts: Vec<Post>,
}

/// Settings for the `Post` → `Article` projection.
#[derive(Debug, Clone)]
struct Projection {
    image_base: String,
    excerpt_length: usize,
    words_per_minute: u32,
}

/// Client for the hosted Content API.
#[derive(Debug, Clone)]
pub struct HostedClient {
    http: reqwest::Client,
    credentials: Credentials,
    base: String,
    api_version: String,
    projection: Projection,
}

impl HostedClient {
    /// Validate credentials and build the HTTP client.
    ///
    /// No request is made here; a bad key or URL is reported immediately.
    pub fn new(config: &HostedConfig) -> Result<Self, ConfigError> {
        let credentials = config.credentials()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::Validation(format!("failed to create HTTP client: {e}")))?;

        let base = credentials.url.as_str().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            credentials,
            base,
            api_version: config.api_version.clone(),
            projection: Projection {
                image_base: config.image_base.clone(),
                excerpt_length: DEFAULT_EXCERPT_LENGTH,
                words_per_minute: WORDS_PER_MINUTE,
            },
        })
    }

    /// Client with the site-wide excerpt and reading-time settings applied.
    pub fn from_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        let mut client = Self::new(&config.hosted)?;
        client.projection.excerpt_length = config.excerpt_length;
        client.projection.words_per_minute = config.words_per_minute;
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Check that the API answers with JSON at all.
    pub async fn probe(&self) -> bool {
        match self.try_probe().await {
            Ok(post_count) => {
                tracing::debug!(base_url = %self.base, post_count, "hosted API reachable");
                true
            }
            Err(e) => {
                self.log_failure("probe", "-", &e);
                false
            }
        }
    }

    /// List posts with tags and authors. Probes first; a failed probe skips
    /// the query.
    pub async fn get_posts(&self, options: &BrowseOptions) -> Vec<Post> {
        if !self.probe().await {
            tracing::error!(op = "get_posts", "skipping posts fetch after failed connection test");
            return Vec::new();
        }
        self.try_browse(options).await.unwrap_or_else(|e| {
            self.log_failure("get_posts", &format!("{options:?}"), &e);
            Vec::new()
        })
    }

    /// A single post by slug, or `None` when it does not exist or the
    /// request fails.
    pub async fn get_post(&self, slug: &str) -> Option<Post> {
        if matches!(slug, "" | "." | "..") {
            tracing::debug!(op = "get_post", slug, "not a post slug");
            return None;
        }
        match self.try_read(slug).await {
            Ok(post) => post,
            Err(e) => {
                self.log_failure("get_post", slug, &e);
                None
            }
        }
    }

    /// The most recent post flagged as featured.
    pub async fn get_featured_post(&self) -> Option<Post> {
        let options = BrowseOptions::default().limit(1).filter("featured:true");
        match self.try_browse(&options).await {
            Ok(posts) => posts.into_iter().next(),
            Err(e) => {
                self.log_failure("get_featured_post", "featured:true", &e);
                None
            }
        }
    }

    /// Posts carrying `tag`. A filter in `options` replaces the tag filter.
    pub async fn get_posts_by_tag(&self, tag: &str, options: &BrowseOptions) -> Vec<Post> {
        let mut query = options.clone();
        if query.filter.is_none() {
            query.filter = Some(format!("tag:{tag}"));
        }
        self.try_browse(&query).await.unwrap_or_else(|e| {
            self.log_failure("get_posts_by_tag", tag, &e);
            Vec::new()
        })
    }

    /// Project a post onto the shared view model.
    pub fn to_article(&self, post: Post) -> Article {
        let p = &self.projection;
        let html = post.html.unwrap_or_default();
        let body = outline_html(&html);

        let excerpt = match or_fallback(
            &[post.custom_excerpt.as_deref(), post.excerpt.as_deref()],
            "",
        ) {
            authored if authored.is_empty() => {
                generate_excerpt(body.html.trim(), p.excerpt_length)
            }
            authored => generate_excerpt(&authored, p.excerpt_length),
        };
        let reading_time = match post.reading_time {
            Some(minutes) if minutes >= 1 => minutes,
            _ => reading_time_at(&body.html, p.words_per_minute),
        };
        let author = post
            .authors
            .into_iter()
            .next()
            .map(|a| Author {
                name: or_fallback(&[a.name.as_deref()], UNKNOWN_AUTHOR),
                bio: a.bio.unwrap_or_default(),
                profile_image: a
                    .profile_image
                    .as_deref()
                    .and_then(|src| normalize_src(src, &p.image_base)),
            })
            .unwrap_or_else(Author::unknown);
        let tags = post.tags.into_iter().map(project_tag).collect();

        Article {
            title: or_fallback(&[post.title.as_deref()], &title_from_slug(&post.slug)),
            excerpt,
            published_at: published_at_or_now(post.published_at.as_deref(), &post.slug),
            reading_time,
            feature_image: post
                .feature_image
                .as_deref()
                .and_then(|src| normalize_src(src, &p.image_base)),
            author,
            tags,
            sections: body.sections,
            content: body.html,
            slug: post.slug,
        }
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// `{url}/ghost/api/{segments..}/` with each segment percent-encoded, so
    /// a slug can never reach another resource.
    fn api_url(&self, segments: &[&str]) -> Result<Url, HostedError> {
        let mut url = self.credentials.url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| HostedError::BaseUrl(self.base.clone()))?
            .pop_if_empty()
            .extend(["ghost", "api"])
            .extend(segments)
            .push("");
        Ok(url)
    }

    async fn try_probe(&self) -> Result<usize, HostedError> {
        let url = self.api_url(&["v3", "content", "posts"])?;
        let response = self
            .http
            .get(url.clone())
            .query(&[("key", self.credentials.key.as_str())])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let value: serde_json::Value = decode(response, url.as_str()).await?;
        Ok(value
            .get("posts")
            .and_then(|p| p.as_array())
            .map_or(0, Vec::len))
    }

    async fn try_browse(&self, options: &BrowseOptions) -> Result<Vec<Post>, HostedError> {
        let url = self.api_url(&["content", "posts"])?;
        let mut query = vec![
            ("key", self.credentials.key.clone()),
            ("include", INCLUDE.to_string()),
        ];
        query.extend(options.query_pairs());

        let response = self
            .http
            .get(url.clone())
            .query(&query)
            .header("Accept-Version", &self.api_version)
            .send()
            .await?;
        let envelope: PostsEnvelope = decode(response, url.as_str()).await?;
        Ok(envelope.posts)
    }

    async fn try_read(&self, slug: &str) -> Result<Option<Post>, HostedError> {
        let url = self.api_url(&["content", "posts", "slug", slug])?;
        let response = self
            .http
            .get(url.clone())
            .query(&[("key", self.credentials.key.as_str()), ("include", INCLUDE)])
            .header("Accept-Version", &self.api_version)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(op = "get_post", slug, "post not found");
            return Ok(None);
        }
        let envelope: PostsEnvelope = decode(response, url.as_str()).await?;
        Ok(envelope.posts.into_iter().next())
    }

    fn log_failure(&self, op: &str, key: &str, error: &HostedError) {
        tracing::error!(
            op,
            key,
            base_url = %self.base,
            has_api_key = !self.credentials.key.is_empty(),
            api_key_length = self.credentials.key.len(),
            error = %error,
            "hosted API request failed"
        );
    }
}

fn project_tag(tag: PostTag) -> Tag {
    let name = or_fallback(&[tag.name.as_deref()], UNTITLED_TAG);
    let slug = match tag.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => slug.to_string(),
        None => slugify(&name),
    };
    Tag {
        slug,
        name,
        description: tag.description.unwrap_or_default(),
    }
}

/// Check the status and decode a JSON body.
async fn decode<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
    url: &str,
) -> Result<T, HostedError> {
    let status = response.status();
    if !status.is_success() {
        return Err(HostedError::Status {
            status,
            url: url.to_string(),
        });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| HostedError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
