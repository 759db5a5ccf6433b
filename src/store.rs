//! File-based content store adapter.
//!
//! Reads articles, authors, and tags from a local directory tree in the
//! layout a git-backed CMS editor writes, and assembles normalized
//! [`Article`] view models from them.
//!
//! ## Directory Structure
//!
//! ```text
//! content/
//! ├── articles/
//! │   ├── climate-policy.mdoc          # YAML frontmatter + Markdoc body, slug = file stem
//! │   ├── 5-things-to-know.mdoc        # Leading numbers stay in the slug
//! │   └── voice-debate/
//! │       └── index.mdoc               # Directory form, slug = directory name
//! ├── authors/
//! │   └── sarah-mitchell.yaml          # name, bio, profileImage
//! └── tags/
//!     └── politics.yaml                # name, description
//! ```
//!
//! ## Article Frontmatter
//!
//! ```yaml
//! ---
//! title: Australia's Climate Policy Faces New Challenges
//! publishedAt: 2024-03-15
//! author: sarah-mitchell
//! tags: [climate-policy, politics]
//! featureImage: parliament.jpg       # or { src: parliament.jpg }
//! excerpt: Optional authored summary
//! ---
//! ```
//!
//! ## Degradation
//!
//! Relationships are resolved per article and never fail the whole read:
//!
//! - missing or unreadable author → [`Author::unknown`]
//! - tag reference that does not resolve → dropped, order of the rest kept
//! - `author` or `tags` of the wrong shape (a map, a scalar `tags`) → that
//!   field alone degrades as above
//! - article file that cannot be read or parsed → skipped from lists (logged),
//!   `None` from a by-slug lookup
//!
//! A collection directory that does not exist is an empty collection.

use crate::config::SiteConfig;
use crate::image::{ImageRef, normalize_image};
use crate::markup::render_markdown;
use crate::naming::{entry_slug, title_from_slug};
use crate::text::{generate_excerpt, reading_time_at};
use crate::types::{
    Article, Author, Tag, UNKNOWN_AUTHOR, UNTITLED_TAG, or_fallback, published_at_or_now,
};
use futures::future::join_all;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Unterminated frontmatter in {0}")]
    UnterminatedFrontmatter(PathBuf),
    #[error("Entry discovery task failed: {0}")]
    Discovery(String),
}

const ARTICLE_EXTENSIONS: &[&str] = &["mdoc", "md", "markdoc"];
const RECORD_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// The three collections of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Articles,
    Authors,
    Tags,
}

impl Collection {
    pub fn dir_name(self) -> &'static str {
        match self {
            Collection::Articles => "articles",
            Collection::Authors => "authors",
            Collection::Tags => "tags",
        }
    }

    fn extensions(self) -> &'static [&'static str] {
        match self {
            Collection::Articles => ARTICLE_EXTENSIONS,
            Collection::Authors | Collection::Tags => RECORD_EXTENSIONS,
        }
    }
}

/// One discovered entry: its slug and file.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEntry {
    pub slug: String,
    pub path: PathBuf,
}

/// Slug → file lookup for one collection.
type Index = HashMap<String, PathBuf>;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ArticleFrontmatter {
    title: Option<String>,
    published_at: Option<String>,
    author: Value,
    tags: Value,
    feature_image: Option<ImageRef>,
    excerpt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AuthorRecord {
    name: Option<String>,
    bio: Option<String>,
    profile_image: Option<ImageRef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TagRecord {
    name: Option<String>,
    description: Option<String>,
}

/// A parsed but not yet assembled article file.
#[derive(Debug)]
struct RawArticle {
    front: ArticleFrontmatter,
    body: String,
}

/// Reader over a local content store.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    image_base: String,
    excerpt_length: usize,
    words_per_minute: u32,
}

impl FileStore {
    /// A store rooted at `root` with default derivation settings.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let defaults = SiteConfig::default();
        Self {
            root: root.into(),
            image_base: defaults.store.image_base,
            excerpt_length: defaults.excerpt_length,
            words_per_minute: defaults.words_per_minute,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            root: PathBuf::from(&config.store.content_dir),
            image_base: config.store.image_base.clone(),
            excerpt_length: config.excerpt_length,
            words_per_minute: config.words_per_minute,
        }
    }

    /// Override the content root (e.g. from a CLI flag).
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every article, in store order.
    pub async fn all_articles(&self) -> Vec<Article> {
        let entries = self.entries_or_empty(Collection::Articles).await;
        let (authors, tags) = self.relationship_indexes().await;

        let loaded = join_all(entries.iter().map(|entry| async {
            match read_article_file(&entry.path).await {
                Ok(raw) => Some(self.assemble(&entry.slug, raw, &authors, &tags).await),
                Err(e) => {
                    tracing::warn!(op = "all_articles", slug = %entry.slug, error = %e, "skipping unreadable article");
                    None
                }
            }
        }))
        .await;

        loaded.into_iter().flatten().collect()
    }

    /// The article with this slug, or `None` if it does not exist or cannot
    /// be read.
    pub async fn article(&self, slug: &str) -> Option<Article> {
        let entries = match self.entries(Collection::Articles).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(op = "article", slug, error = %e, "failed to list articles");
                return None;
            }
        };
        let entry = entries.into_iter().find(|e| e.slug == slug)?;

        let raw = match read_article_file(&entry.path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(op = "article", slug, error = %e, "error reading article");
                return None;
            }
        };
        let (authors, tags) = self.relationship_indexes().await;
        Some(self.assemble(&entry.slug, raw, &authors, &tags).await)
    }

    /// The first article in store order. There is no separate featured flag.
    pub async fn featured_article(&self) -> Option<Article> {
        self.all_articles().await.into_iter().next()
    }

    /// Articles that reference `tag_slug`, in store order.
    pub async fn articles_by_tag(&self, tag_slug: &str) -> Vec<Article> {
        self.all_articles()
            .await
            .into_iter()
            .filter(|a| a.has_tag(tag_slug))
            .collect()
    }

    /// Every author record, each independently defaulted.
    pub async fn all_authors(&self) -> Vec<Author> {
        let entries = self.entries_or_empty(Collection::Authors).await;
        let records = join_all(entries.iter().map(|e| read_record::<AuthorRecord>(&e.path))).await;

        entries
            .iter()
            .zip(records)
            .filter_map(|(entry, record)| match record {
                Ok(record) => Some(self.project_author(record)),
                Err(e) => {
                    tracing::warn!(op = "all_authors", slug = %entry.slug, error = %e, "skipping unreadable author");
                    None
                }
            })
            .collect()
    }

    /// Every tag record, each independently defaulted.
    pub async fn all_tags(&self) -> Vec<Tag> {
        let entries = self.entries_or_empty(Collection::Tags).await;
        let records = join_all(entries.iter().map(|e| read_record::<TagRecord>(&e.path))).await;

        entries
            .iter()
            .zip(records)
            .filter_map(|(entry, record)| match record {
                Ok(record) => Some(project_tag(&entry.slug, record)),
                Err(e) => {
                    tracing::warn!(op = "all_tags", slug = %entry.slug, error = %e, "skipping unreadable tag");
                    None
                }
            })
            .collect()
    }

    /// Discover the entries of a collection, in store order.
    pub async fn entries(&self, collection: Collection) -> Result<Vec<StoreEntry>, StoreError> {
        let dir = self.root.join(collection.dir_name());
        tokio::task::spawn_blocking(move || discover_entries(&dir, collection))
            .await
            .map_err(|e| StoreError::Discovery(e.to_string()))
    }

    async fn entries_or_empty(&self, collection: Collection) -> Vec<StoreEntry> {
        self.entries(collection).await.unwrap_or_else(|e| {
            tracing::error!(collection = collection.dir_name(), error = %e, "failed to list collection");
            Vec::new()
        })
    }

    async fn relationship_indexes(&self) -> (Index, Index) {
        let (authors, tags) = tokio::join!(
            self.entries_or_empty(Collection::Authors),
            self.entries_or_empty(Collection::Tags)
        );
        (to_index(authors), to_index(tags))
    }

    /// Resolve relationships, render the body, and derive the summary fields.
    async fn assemble(
        &self,
        slug: &str,
        raw: RawArticle,
        author_index: &Index,
        tag_index: &Index,
    ) -> Article {
        let RawArticle { front, body } = raw;
        let author_slug = author_ref(slug, &front.author);
        let tag_slugs = tag_refs(slug, &front.tags);

        let (author, tags) = tokio::join!(
            self.resolve_author(slug, author_slug.as_deref(), author_index),
            resolve_tags(slug, &tag_slugs, tag_index)
        );

        let rendered = render_markdown(&body);
        let excerpt = match front.excerpt.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(authored) => generate_excerpt(authored, self.excerpt_length),
            None => generate_excerpt(rendered.html.trim(), self.excerpt_length),
        };

        Article {
            slug: slug.to_string(),
            title: or_fallback(&[front.title.as_deref()], &title_from_slug(slug)),
            excerpt,
            published_at: published_at_or_now(front.published_at.as_deref(), slug),
            reading_time: reading_time_at(&rendered.html, self.words_per_minute),
            feature_image: normalize_image(front.feature_image.as_ref(), &self.image_base),
            author,
            tags,
            sections: rendered.sections,
            content: rendered.html,
        }
    }

    async fn resolve_author(&self, article: &str, author: Option<&str>, index: &Index) -> Author {
        let Some(author_slug) = author else {
            return Author::unknown();
        };
        let Some(path) = index.get(author_slug) else {
            tracing::warn!(article, author = author_slug, "author not found, using fallback");
            return Author::unknown();
        };
        match read_record::<AuthorRecord>(path).await {
            Ok(record) => self.project_author(record),
            Err(e) => {
                tracing::warn!(article, author = author_slug, error = %e, "author unreadable, using fallback");
                Author::unknown()
            }
        }
    }

    fn project_author(&self, record: AuthorRecord) -> Author {
        Author {
            name: or_fallback(&[record.name.as_deref()], UNKNOWN_AUTHOR),
            bio: record.bio.unwrap_or_default(),
            profile_image: normalize_image(record.profile_image.as_ref(), &self.image_base),
        }
    }
}

/// A single slug reference. YAML reads slugs like `2024` as numbers.
fn slug_ref(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The `author` field as a slug. Any other shape means no author.
fn author_ref(article: &str, value: &Value) -> Option<String> {
    let slug = slug_ref(value);
    if slug.is_none() && !matches!(value, Value::Null | Value::String(_)) {
        tracing::warn!(article, field = "author", "author is not a slug, using fallback");
    }
    slug
}

/// The `tags` field as a list of slugs. Blank and null entries are skipped;
/// a field that is not a list, or an entry that is not a slug, is dropped.
fn tag_refs(article: &str, value: &Value) -> Vec<String> {
    let items = match value {
        Value::Null => return Vec::new(),
        Value::Sequence(items) => items,
        _ => {
            tracing::warn!(article, field = "tags", "tags is not a list, dropping");
            return Vec::new();
        }
    };
    items
        .iter()
        .filter_map(|item| {
            let slug = slug_ref(item);
            if slug.is_none() && !matches!(item, Value::Null | Value::String(_)) {
                tracing::warn!(article, field = "tags", "tag entry is not a slug, dropping");
            }
            slug
        })
        .collect()
}

/// Resolve every tag reference concurrently, dropping the ones that fail.
async fn resolve_tags(article: &str, refs: &[String], index: &Index) -> Vec<Tag> {
    let lookups = refs.iter().map(|tag_slug| async move {
        let path = index.get(tag_slug.as_str())?;
        match read_record::<TagRecord>(path).await {
            Ok(record) => Some(project_tag(tag_slug, record)),
            Err(e) => {
                tracing::warn!(article, tag = %tag_slug, error = %e, "tag unreadable, dropping");
                None
            }
        }
    });
    join_all(lookups).await.into_iter().flatten().collect()
}

fn project_tag(slug: &str, record: TagRecord) -> Tag {
    Tag {
        slug: slug.to_string(),
        name: or_fallback(&[record.name.as_deref()], UNTITLED_TAG),
        description: record.description.unwrap_or_default(),
    }
}

fn to_index(entries: Vec<StoreEntry>) -> Index {
    entries.into_iter().map(|e| (e.slug, e.path)).collect()
}

// =============================================================================
// Discovery and parsing
// =============================================================================

/// Walk one collection directory and return its entries in store order.
///
/// Accepts `<slug>.<ext>` files and `<slug>/index.<ext>` directories.
/// Entries are ordered by slug. When two files resolve to the same slug the
/// first by file name wins.
fn discover_entries(dir: &Path, collection: Collection) -> Vec<StoreEntry> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let extensions = collection.extensions();

    let mut entries: Vec<StoreEntry> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(dir = %dir.display(), error = %err, "skipping unreadable path");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| entry_for(e.path(), e.depth(), extensions))
        .collect();

    entries.sort_by(|a, b| a.slug.cmp(&b.slug));

    let mut seen = std::collections::HashSet::new();
    entries.retain(|entry| {
        let first = seen.insert(entry.slug.clone());
        if !first {
            tracing::warn!(
                collection = collection.dir_name(),
                slug = %entry.slug,
                path = %entry.path.display(),
                "duplicate slug, keeping the first entry"
            );
        }
        first
    });
    entries
}

fn entry_for(path: &Path, depth: usize, extensions: &[&str]) -> Option<StoreEntry> {
    let name = path.file_name()?.to_string_lossy();
    if name.starts_with('.') {
        return None;
    }
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    if !extensions.contains(&ext.as_str()) {
        return None;
    }
    let stem = path.file_stem()?.to_string_lossy().to_string();

    let key = match depth {
        1 => stem,
        2 if stem == "index" => path.parent()?.file_name()?.to_string_lossy().to_string(),
        _ => return None,
    };
    Some(StoreEntry {
        slug: entry_slug(&key)?.to_string(),
        path: path.to_path_buf(),
    })
}

/// Split a document into YAML frontmatter and body.
///
/// A document without a leading `---` line has empty frontmatter.
fn split_frontmatter<'a>(content: &'a str, path: &Path) -> Result<(&'a str, &'a str), StoreError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return Ok(("", content));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let front = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((front, body));
        }
        offset += line.len();
    }
    Err(StoreError::UnterminatedFrontmatter(path.to_path_buf()))
}

async fn read_to_string(path: &Path) -> Result<String, StoreError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn parse_yaml<T: for<'de> Deserialize<'de> + Default>(
    yaml: &str,
    path: &Path,
) -> Result<T, StoreError> {
    if yaml.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(yaml).map_err(|source| StoreError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

async fn read_article_file(path: &Path) -> Result<RawArticle, StoreError> {
    let content = read_to_string(path).await?;
    let (front, body) = split_frontmatter(&content, path)?;
    Ok(RawArticle {
        front: parse_yaml(front, path)?,
        body: body.to_string(),
    })
}

async fn read_record<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> Result<T, StoreError> {
    let content = read_to_string(path).await?;
    parse_yaml(&content, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    // =========================================================================
    // Fixture store
    // =========================================================================

    #[tokio::test]
    async fn fixture_articles_in_store_order() {
        let tmp = setup_fixtures();
        let store = FileStore::new(tmp.path());
        let articles = store.all_articles().await;

        assert_eq!(
            article_slugs(&articles),
            vec!["budget-reply", "climate-policy", "untagged-note", "voice-debate"]
        );
    }

    #[tokio::test]
    async fn fixture_article_fully_assembled() {
        let tmp = setup_fixtures();
        let store = FileStore::new(tmp.path());
        let article = store.article("climate-policy").await.unwrap();

        assert_eq!(
            article.title,
            "Australia's Climate Policy Faces New Challenges in Global Context"
        );
        assert_eq!(article.author.name, "Sarah Mitchell");
        assert_eq!(
            article.author.profile_image.as_deref(),
            Some("/images/authors/sarah.jpg")
        );
        assert_eq!(tag_names(&article), vec!["Climate Policy", "Politics"]);
        assert_eq!(
            article.feature_image.as_deref(),
            Some("/images/articles/parliament.jpg")
        );
        assert!(article.content.contains("<h2 id=\"international-pressure-mounts\">"));
        assert_eq!(article.sections.len(), 2);
        assert!(!article.excerpt.contains('<'));
        assert!(article.reading_time >= 1);
        assert_eq!(article.published_at.to_rfc3339(), "2024-03-15T00:00:00+00:00");
    }

    #[tokio::test]
    async fn fixture_unresolved_tag_and_object_image() {
        let tmp = setup_fixtures();
        let articles = FileStore::new(tmp.path()).all_articles().await;
        let budget = find_article(&articles, "budget-reply");
        assert!(budget.tags.is_empty());
        assert_eq!(
            budget.feature_image.as_deref(),
            Some("/images/articles/budget-night.jpg")
        );
        assert!(budget.excerpt.starts_with("The opposition's budget reply"));
        assert_eq!(budget.author.profile_image.as_deref(), Some("/images/articles/james.jpg"));
    }

    #[tokio::test]
    async fn fixture_directory_entry_uses_directory_slug() {
        let tmp = setup_fixtures();
        let store = FileStore::new(tmp.path());
        let article = store.article("voice-debate").await.unwrap();
        assert_eq!(article.feature_image.as_deref(), Some("https://cdn.example.com/voice.jpg"));
    }

    #[tokio::test]
    async fn fixture_authors_and_tags() {
        let tmp = setup_fixtures();
        let store = FileStore::new(tmp.path());

        let authors = store.all_authors().await;
        let names: Vec<&str> = authors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["James Okafor", "Sarah Mitchell", UNKNOWN_AUTHOR]);

        let tags = store.all_tags().await;
        let slugs: Vec<&str> = tags.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["climate-policy", "indigenous-rights", "politics"]);
    }

    #[tokio::test]
    async fn fixture_articles_by_tag() {
        let tmp = setup_fixtures();
        let store = FileStore::new(tmp.path());
        let politics = store.articles_by_tag("politics").await;
        assert_eq!(article_slugs(&politics), vec!["climate-policy", "voice-debate"]);
        let voice = find_article(&politics, "voice-debate");
        assert_eq!(tag_names(voice), vec!["Indigenous Rights", "Politics"]);
        assert!(voice.author.is_unknown());
        assert!(store.articles_by_tag("sport").await.is_empty());
    }

    // =========================================================================
    // Lookup and fallback behavior
    // =========================================================================

    #[tokio::test]
    async fn missing_slug_is_none() {
        let tmp = setup_fixtures();
        let store = FileStore::new(tmp.path());
        assert!(store.article("nonexistent-slug").await.is_none());
    }

    #[tokio::test]
    async fn empty_store() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        assert!(store.all_articles().await.is_empty());
        assert!(store.featured_article().await.is_none());
        assert!(store.all_authors().await.is_empty());
        assert!(store.all_tags().await.is_empty());
    }

    #[tokio::test]
    async fn featured_is_first_article() {
        let tmp = setup_fixtures();
        let store = FileStore::new(tmp.path());
        let featured = store.featured_article().await.unwrap();
        assert_eq!(featured.slug, "budget-reply");
    }

    #[tokio::test]
    async fn numeric_slugs_are_kept_whole() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "5-things-to-know", "title: Five Things", "Body.");
        write_article(tmp.path(), "10-things-to-know", "title: Ten Things", "Body.");
        write_article(tmp.path(), "2024-federal-budget", "title: Budget", "Body.");

        let store = FileStore::new(tmp.path());
        assert_eq!(
            article_slugs(&store.all_articles().await),
            vec!["10-things-to-know", "2024-federal-budget", "5-things-to-know"]
        );
        let five = store.article("5-things-to-know").await.unwrap();
        assert_eq!(five.title, "Five Things");
        let ten = store.article("10-things-to-know").await.unwrap();
        assert_eq!(ten.title, "Ten Things");
        assert!(store.article("2024-federal-budget").await.is_some());
        assert!(store.article("things-to-know").await.is_none());
    }

    #[tokio::test]
    async fn missing_author_falls_back() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "orphan", "title: Orphan\nauthor: nobody", "Body.");
        write_article(tmp.path(), "anonymous", "title: Anonymous", "Body.");

        let store = FileStore::new(tmp.path());
        let articles = store.all_articles().await;
        assert_eq!(articles.len(), 2);
        for article in &articles {
            assert_eq!(article.author.name, UNKNOWN_AUTHOR);
            assert_eq!(article.author.bio, "");
            assert!(article.author.profile_image.is_none());
        }
    }

    #[tokio::test]
    async fn unreadable_author_falls_back() {
        let tmp = TempDir::new().unwrap();
        write_record(tmp.path(), Collection::Authors, "broken", "name: [unclosed");
        write_article(tmp.path(), "a", "author: broken", "Body.");

        let store = FileStore::new(tmp.path());
        let article = store.article("a").await.unwrap();
        assert!(article.author.is_unknown());
    }

    #[tokio::test]
    async fn author_without_name_gets_default_name() {
        let tmp = TempDir::new().unwrap();
        write_record(tmp.path(), Collection::Authors, "ghost", "bio: Writes at night");
        write_article(tmp.path(), "a", "author: ghost", "Body.");

        let store = FileStore::new(tmp.path());
        let article = store.article("a").await.unwrap();
        assert_eq!(article.author.name, UNKNOWN_AUTHOR);
        assert_eq!(article.author.bio, "Writes at night");
    }

    #[tokio::test]
    async fn unresolvable_tag_dropped_order_kept() {
        let tmp = TempDir::new().unwrap();
        write_record(tmp.path(), Collection::Tags, "world", "name: World");
        write_record(tmp.path(), Collection::Tags, "economy", "name: Economy");
        write_article(
            tmp.path(),
            "a",
            "tags: [world, missing, ~, economy]",
            "Body.",
        );

        let store = FileStore::new(tmp.path());
        let article = store.article("a").await.unwrap();
        assert_eq!(tag_names(&article), vec!["World", "Economy"]);
    }

    #[tokio::test]
    async fn two_tag_refs_one_missing() {
        let tmp = TempDir::new().unwrap();
        write_record(tmp.path(), Collection::Tags, "politics", "name: Politics");
        write_article(tmp.path(), "a", "tags: [ghost-tag, politics]", "Body.");

        let store = FileStore::new(tmp.path());
        let articles = store.all_articles().await;
        assert_eq!(articles[0].tags.len(), 1);
        assert_eq!(articles[0].tags[0].name, "Politics");
    }

    #[tokio::test]
    async fn malformed_relationships_degrade_only_that_field() {
        let tmp = TempDir::new().unwrap();
        write_record(tmp.path(), Collection::Authors, "sarah", "name: Sarah");
        write_record(tmp.path(), Collection::Tags, "politics", "name: Politics");
        write_article(tmp.path(), "good", "author: sarah\ntags: [politics]", "Body.");
        write_article(tmp.path(), "scalar", "title: Scalar\ntags: politics", "Body.");
        write_article(tmp.path(), "objauthor", "title: Object\nauthor: { slug: sarah }", "Body.");
        write_article(
            tmp.path(),
            "mixed",
            "tags: [politics, { slug: world }, [nested]]",
            "Body.",
        );

        let store = FileStore::new(tmp.path());
        assert_eq!(
            article_slugs(&store.all_articles().await),
            vec!["good", "mixed", "objauthor", "scalar"]
        );

        let scalar = store.article("scalar").await.unwrap();
        assert_eq!(scalar.title, "Scalar");
        assert!(scalar.tags.is_empty());

        let object = store.article("objauthor").await.unwrap();
        assert_eq!(object.title, "Object");
        assert!(object.author.is_unknown());

        let mixed = store.article("mixed").await.unwrap();
        assert_eq!(tag_names(&mixed), vec!["Politics"]);
    }

    #[tokio::test]
    async fn numeric_references_resolve_as_slugs() {
        let tmp = TempDir::new().unwrap();
        write_record(tmp.path(), Collection::Tags, "2024", "name: Election 2024");
        write_article(tmp.path(), "a", "tags: [2024]", "Body.");

        let article = FileStore::new(tmp.path()).article("a").await.unwrap();
        assert_eq!(tag_names(&article), vec!["Election 2024"]);
    }

    #[tokio::test]
    async fn tag_without_name_is_untitled() {
        let tmp = TempDir::new().unwrap();
        write_record(tmp.path(), Collection::Tags, "misc", "");
        write_article(tmp.path(), "a", "tags: [misc]", "Body.");

        let store = FileStore::new(tmp.path());
        let article = store.article("a").await.unwrap();
        assert_eq!(article.tags[0].name, UNTITLED_TAG);
        assert_eq!(article.tags[0].description, "");
    }

    #[tokio::test]
    async fn broken_article_skipped_from_list() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "good", "title: Good", "Body.");
        let dir = tmp.path().join("articles");
        fs::write(dir.join("bad.mdoc"), "---\ntitle: never closed\n").unwrap();

        let store = FileStore::new(tmp.path());
        assert_eq!(article_slugs(&store.all_articles().await), vec!["good"]);
        assert!(store.article("bad").await.is_none());
    }

    #[tokio::test]
    async fn missing_fields_get_defaults() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("articles");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("bare-note.md"), "Just a body, no frontmatter.").unwrap();

        let before = chrono::Utc::now();
        let store = FileStore::new(tmp.path());
        let article = store.article("bare-note").await.unwrap();
        assert_eq!(article.title, "Bare note");
        assert_eq!(article.excerpt, "Just a body, no frontmatter.");
        assert_eq!(article.reading_time, 1);
        assert!(article.published_at >= before);
        assert!(article.feature_image.is_none());
        assert!(article.tags.is_empty());
    }

    #[tokio::test]
    async fn authored_excerpt_is_bounded() {
        let tmp = TempDir::new().unwrap();
        let long = "word ".repeat(100);
        write_article(tmp.path(), "a", &format!("excerpt: \"{long}\""), "Body.");

        let store = FileStore::new(tmp.path());
        let article = store.article("a").await.unwrap();
        assert!(article.excerpt.ends_with("..."));
        assert!(article.excerpt.chars().count() <= 203);
    }

    #[tokio::test]
    async fn generated_excerpt_is_bounded_plain_text() {
        let tmp = TempDir::new().unwrap();
        let body = format!("## Heading\n\n{}", "Lorem *ipsum* dolor ".repeat(40));
        write_article(tmp.path(), "a", "title: A", &body);

        let store = FileStore::new(tmp.path());
        let article = store.article("a").await.unwrap();
        assert!(!article.excerpt.contains('<'));
        assert!(article.excerpt.ends_with("..."));
        assert!(article.excerpt.chars().count() <= 203);
    }

    #[tokio::test]
    async fn config_settings_are_applied() {
        let tmp = TempDir::new().unwrap();
        write_article(
            tmp.path(),
            "a",
            "featureImage: { src: hero.png }",
            &"word ".repeat(100),
        );

        let mut config = SiteConfig::default();
        config.store.content_dir = tmp.path().to_string_lossy().to_string();
        config.store.image_base = "/media".into();
        config.words_per_minute = 50;
        config.excerpt_length = 20;

        let store = FileStore::from_config(&config);
        let article = store.article("a").await.unwrap();
        assert_eq!(article.feature_image.as_deref(), Some("/media/hero.png"));
        assert_eq!(article.reading_time, 2);
        assert_eq!(article.excerpt, "word word word word...");
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    #[test]
    fn entries_sorted_by_full_slug() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("articles");
        fs::create_dir_all(&dir).unwrap();
        for name in ["zeta.mdoc", "020-second.mdoc", "alpha.md", "010-first.mdoc"] {
            fs::write(dir.join(name), "").unwrap();
        }

        let slugs: Vec<String> = discover_entries(&dir, Collection::Articles)
            .into_iter()
            .map(|e| e.slug)
            .collect();
        assert_eq!(slugs, vec!["010-first", "020-second", "alpha", "zeta"]);
    }

    #[test]
    fn discovery_ignores_foreign_and_hidden_files() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("articles");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();
        fs::write(dir.join(".draft.mdoc"), "").unwrap();
        fs::write(dir.join("nested/other.mdoc"), "").unwrap();
        fs::write(dir.join("real.mdoc"), "").unwrap();

        let entries = discover_entries(&dir, Collection::Articles);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].slug, "real");
    }

    #[test]
    fn duplicate_slug_keeps_first_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("articles");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("story.mdoc"), "").unwrap();
        fs::write(dir.join("story.md"), "").unwrap();

        let entries = discover_entries(&dir, Collection::Articles);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].path.ends_with("story.md"));
    }

    #[test]
    fn missing_collection_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(discover_entries(&tmp.path().join("tags"), Collection::Tags).is_empty());
    }

    // =========================================================================
    // Frontmatter
    // =========================================================================

    #[test]
    fn split_frontmatter_basic() {
        let (front, body) =
            split_frontmatter("---\ntitle: A\n---\nBody\n", Path::new("a.mdoc")).unwrap();
        assert_eq!(front, "title: A\n");
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn split_frontmatter_crlf() {
        let (front, body) =
            split_frontmatter("---\r\ntitle: A\r\n---\r\nBody", Path::new("a.mdoc")).unwrap();
        assert_eq!(front, "title: A\r\n");
        assert_eq!(body, "Body");
    }

    #[test]
    fn split_frontmatter_absent() {
        let (front, body) = split_frontmatter("Body only", Path::new("a.mdoc")).unwrap();
        assert_eq!(front, "");
        assert_eq!(body, "Body only");
    }

    #[test]
    fn split_frontmatter_unterminated() {
        let result = split_frontmatter("---\ntitle: A\n", Path::new("a.mdoc"));
        assert!(matches!(result, Err(StoreError::UnterminatedFrontmatter(_))));
    }
}
