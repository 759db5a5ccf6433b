//! Shared test utilities for the broadsheet test suite.
//!
//! Provides fixture setup, writers for building small stores on disk, and
//! lookup helpers that work with the normalized [`Article`] model.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let articles = FileStore::new(tmp.path()).all_articles().await;
//!
//! let article = find_article(&articles, "climate-policy");
//! assert_eq!(tag_names(article), vec!["Climate Policy", "Politics"]);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::naming::title_from_slug;
use crate::store::Collection;
use crate::types::{Article, Author, Tag, parse_published_at};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Store writers
// =========================================================================

/// Write `articles/{name}.mdoc` with the given frontmatter and body.
pub fn write_article(root: &Path, name: &str, frontmatter: &str, body: &str) {
    let dir = root.join(Collection::Articles.dir_name());
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(format!("{name}.mdoc")),
        format!("---\n{frontmatter}\n---\n{body}\n"),
    )
    .unwrap();
}

/// Write `{collection}/{slug}.yaml`.
pub fn write_record(root: &Path, collection: Collection, slug: &str, yaml: &str) {
    let dir = root.join(collection.dir_name());
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{slug}.yaml")), yaml).unwrap();
}

// =========================================================================
// Model builders
// =========================================================================

/// An article with predictable fields: title from the slug, published
/// 15 March 2024, 3 minutes, unknown author, tags named after their slugs.
pub fn sample_article(slug: &str, tags: &[&str]) -> Article {
    Article {
        slug: slug.to_string(),
        title: title_from_slug(slug),
        content: format!("<p>Body of {slug}</p>"),
        excerpt: format!("Body of {slug}"),
        published_at: parse_published_at("2024-03-15").unwrap(),
        reading_time: 3,
        feature_image: None,
        author: Author::unknown(),
        tags: tags
            .iter()
            .map(|t| Tag {
                slug: t.to_string(),
                name: title_from_slug(t),
                description: String::new(),
            })
            .collect(),
        sections: vec![],
    }
}

// =========================================================================
// Lookups and extractors
// =========================================================================

/// Find an article by slug. Panics if not found.
pub fn find_article<'a>(articles: &'a [Article], slug: &str) -> &'a Article {
    articles.iter().find(|a| a.slug == slug).unwrap_or_else(|| {
        panic!(
            "article '{slug}' not found. Available: {:?}",
            article_slugs(articles)
        )
    })
}

/// Slugs of all articles, in order.
pub fn article_slugs(articles: &[Article]) -> Vec<&str> {
    articles.iter().map(|a| a.slug.as_str()).collect()
}

/// Display names of an article's tags, in order.
pub fn tag_names(article: &Article) -> Vec<&str> {
    article.tags.iter().map(|t| t.name.as_str()).collect()
}
