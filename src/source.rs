//! The content source seam.
//!
//! Page code depends on [`ContentSource`] only. Exactly one implementation is
//! active per process, chosen by `source` in `broadsheet.toml`:
//!
//! | `source` | Implementation | Featured article |
//! |----------|----------------|------------------|
//! | `file`   | [`FileStore`]  | first article in store order |
//! | `hosted` | [`HostedClient`] | most recent post flagged featured |

use crate::config::{ConfigError, SiteConfig, SourceKind};
use crate::hosted::{BrowseOptions, HostedClient};
use crate::store::FileStore;
use crate::types::{Article, Author, Tag};
use async_trait::async_trait;
use std::collections::HashSet;

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Every article, newest-first for the hosted source, store order for
    /// the file source.
    async fn all_articles(&self) -> Vec<Article>;

    async fn article(&self, slug: &str) -> Option<Article>;

    async fn featured_article(&self) -> Option<Article>;

    async fn articles_by_tag(&self, tag: &str) -> Vec<Article>;

    async fn all_tags(&self) -> Vec<Tag>;

    async fn all_authors(&self) -> Vec<Author>;

    /// Short name for logs and CLI output.
    fn name(&self) -> &'static str;
}

/// Build the configured source. Configuration problems are fatal here.
pub fn open_source(config: &SiteConfig) -> Result<Box<dyn ContentSource>, ConfigError> {
    match config.source {
        SourceKind::File => Ok(Box::new(FileStore::from_config(config))),
        SourceKind::Hosted => Ok(Box::new(HostedClient::from_config(config)?)),
    }
}

#[async_trait]
impl ContentSource for FileStore {
    async fn all_articles(&self) -> Vec<Article> {
        FileStore::all_articles(self).await
    }

    async fn article(&self, slug: &str) -> Option<Article> {
        FileStore::article(self, slug).await
    }

    async fn featured_article(&self) -> Option<Article> {
        FileStore::featured_article(self).await
    }

    async fn articles_by_tag(&self, tag: &str) -> Vec<Article> {
        FileStore::articles_by_tag(self, tag).await
    }

    async fn all_tags(&self) -> Vec<Tag> {
        FileStore::all_tags(self).await
    }

    async fn all_authors(&self) -> Vec<Author> {
        FileStore::all_authors(self).await
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[async_trait]
impl ContentSource for HostedClient {
    async fn all_articles(&self) -> Vec<Article> {
        let options = BrowseOptions::default().limit("all");
        self.get_posts(&options)
            .await
            .into_iter()
            .map(|post| self.to_article(post))
            .collect()
    }

    async fn article(&self, slug: &str) -> Option<Article> {
        self.get_post(slug).await.map(|post| self.to_article(post))
    }

    async fn featured_article(&self) -> Option<Article> {
        self.get_featured_post()
            .await
            .map(|post| self.to_article(post))
    }

    async fn articles_by_tag(&self, tag: &str) -> Vec<Article> {
        let options = BrowseOptions::default().limit("all");
        self.get_posts_by_tag(tag, &options)
            .await
            .into_iter()
            .map(|post| self.to_article(post))
            .collect()
    }

    async fn all_tags(&self) -> Vec<Tag> {
        let articles = ContentSource::all_articles(self).await;
        unique_tags(articles.iter().flat_map(|a| a.tags.iter()))
    }

    async fn all_authors(&self) -> Vec<Author> {
        let articles = ContentSource::all_articles(self).await;
        let mut seen = HashSet::new();
        articles
            .into_iter()
            .map(|a| a.author)
            .filter(|author| !author.is_unknown() && seen.insert(author.name.clone()))
            .collect()
    }

    fn name(&self) -> &'static str {
        "hosted"
    }
}

/// Tags deduplicated by slug, first occurrence wins.
fn unique_tags<'a>(tags: impl Iterator<Item = &'a Tag>) -> Vec<Tag> {
    let mut seen = HashSet::new();
    tags.filter(|t| seen.insert(t.slug.clone()))
        .cloned()
        .collect()
}
