//! HTML page rendering and static preview builds.
//!
//! Pages consume only the normalized [`Article`] model, so they render the
//! same whichever content source produced it.
//!
//! ## Generated Pages
//!
//! - **Index page** (`/index.html`): featured story plus the latest articles
//! - **Article pages** (`/article/{slug}/index.html`): header, outline, body,
//!   related articles
//! - **Category pages** (`/{category}/index.html`): one per configured
//!   category, listing articles with the category's tag (or all of them)
//! - **Not found** (`/404.html`)
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── 404.html
//! ├── article/
//! │   └── climate-policy/
//! │       └── index.html
//! ├── politics/
//! │   └── index.html
//! └── feed/
//!     └── index.html
//! ```
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Every interpolated string is escaped; the article body is inserted as-is
//! because the markup layer has already sanitized it.

use crate::config::{CategoryConfig, SiteConfig};
use crate::source::ContentSource;
use crate::types::{Article, Section};
use chrono::{DateTime, Utc};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Number of related articles shown under an article.
pub const RELATED_LIMIT: usize = 2;

const CSS: &str = include_str!("../static/style.css");

/// Counts reported after a build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildSummary {
    pub articles: usize,
    pub categories: usize,
    pub skipped: usize,
}

/// Render the whole site from `source` into `out_dir`.
pub async fn build_site(
    source: &dyn ContentSource,
    site: &SiteConfig,
    out_dir: &Path,
) -> Result<BuildSummary, RenderError> {
    let (articles, featured) = tokio::join!(source.all_articles(), source.featured_article());
    let mut summary = BuildSummary::default();

    let index = render_index(featured.as_ref(), &articles, site);
    write_page(&out_dir.join("index.html"), index).await?;

    for article in &articles {
        if !is_path_segment(&article.slug) {
            tracing::warn!(slug = %article.slug, "slug is not a safe path segment, skipping page");
            summary.skipped += 1;
            continue;
        }
        let related = pick_related(article, &articles);
        let page = render_article_page(article, &related, site);
        let path = out_dir.join("article").join(&article.slug).join("index.html");
        write_page(&path, page).await?;
        summary.articles += 1;
    }

    for category in &site.categories {
        let listed = match &category.tag {
            Some(tag) => source.articles_by_tag(tag).await,
            None => articles.clone(),
        };
        let page = render_category_page(category, &listed, site);
        write_page(&out_dir.join(&category.slug).join("index.html"), page).await?;
        summary.categories += 1;
    }

    write_page(&out_dir.join("404.html"), not_found_page(site)).await?;

    tracing::info!(
        source = source.name(),
        out_dir = %out_dir.display(),
        articles = summary.articles,
        categories = summary.categories,
        "site generated"
    );
    Ok(summary)
}

async fn write_page(path: &Path, page: Markup) -> Result<(), RenderError> {
    let io_err = |source| RenderError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(path, page.into_string())
        .await
        .map_err(io_err)
}

fn is_path_segment(slug: &str) -> bool {
    !slug.is_empty() && slug != "." && slug != ".." && !slug.contains(['/', '\\'])
}

/// Candidates for the related list: articles sharing a tag first, then the
/// rest, both in source order. The current article is never included.
pub fn pick_related(article: &Article, all: &[Article]) -> Vec<Article> {
    let others = all.iter().filter(|a| a.slug != article.slug);
    let (sharing, rest): (Vec<&Article>, Vec<&Article>) =
        others.partition(|a| article.tags.iter().any(|t| a.has_tag(&t.slug)));
    sharing
        .into_iter()
        .chain(rest)
        .take(RELATED_LIMIT)
        .cloned()
        .collect()
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%-d %B %Y").to_string()
}

fn article_href(slug: &str) -> String {
    format!("/article/{slug}/")
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(
    title: &str,
    site: &SiteConfig,
    body_class: Option<&str>,
    current: Option<&str>,
    content: Markup,
) -> Markup {
    let full_title = if title.is_empty() {
        site.site_title.clone()
    } else {
        format!("{title} | {}", site.site_title)
    };
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (full_title) }
                style { (PreEscaped(CSS)) }
            }
            body class=[body_class] {
                (site_header(site, current))
                (content)
                footer.site-footer {
                    p.meta { (site.site_title) }
                }
            }
        }
    }
}

/// Renders the masthead and category navigation
fn site_header(site: &SiteConfig, current: Option<&str>) -> Markup {
    html! {
        header.site-header {
            a.site-title href="/" { (site.site_title) }
            nav.site-nav aria-label="Main navigation" {
                ul {
                    @for category in &site.categories {
                        li class=[(current == Some(category.slug.as_str())).then_some("current")] {
                            a href={ "/" (category.slug) "/" } { (category.title) }
                        }
                    }
                }
            }
        }
    }
}

fn article_meta(article: &Article) -> Markup {
    html! {
        p.meta {
            span.author { (article.author.name) }
            " · "
            time datetime=(article.published_at.to_rfc3339()) { (format_date(&article.published_at)) }
            " · "
            span.reading-time { (article.reading_time) " min read" }
        }
    }
}

fn tag_list(article: &Article) -> Markup {
    html! {
        @if !article.tags.is_empty() {
            ul.tags {
                @for tag in &article.tags {
                    li { (tag.name) }
                }
            }
        }
    }
}

fn article_card(article: &Article) -> Markup {
    html! {
        li.article-card {
            a href=(article_href(&article.slug)) {
                @if let Some(image) = &article.feature_image {
                    img src=(image) alt=(article.title) loading="lazy";
                }
                h3 { (article.title) }
            }
            p.excerpt { (article.excerpt) }
            (article_meta(article))
        }
    }
}

fn article_list(articles: &[&Article]) -> Markup {
    html! {
        ul.article-list {
            @for article in articles {
                (article_card(article))
            }
        }
    }
}

/// Table of contents built from the body outline
fn outline(sections: &[Section]) -> Markup {
    html! {
        @if !sections.is_empty() {
            nav.toc aria-label="Contents" {
                ul {
                    @for section in sections {
                        li {
                            a href={ "#" (section.id) } { (section.title) }
                            @if !section.subsections.is_empty() {
                                ul {
                                    @for sub in &section.subsections {
                                        li { a href={ "#" (sub.id) } { (sub.title) } }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the home page: featured story, then every other article
pub fn render_index(featured: Option<&Article>, articles: &[Article], site: &SiteConfig) -> Markup {
    let featured_slug = featured.map(|f| f.slug.as_str());
    let rest: Vec<&Article> = articles
        .iter()
        .filter(|a| Some(a.slug.as_str()) != featured_slug)
        .collect();

    let content = html! {
        main.index-page {
            @if let Some(story) = featured {
                section.featured-story {
                    a href=(article_href(&story.slug)) {
                        @if let Some(image) = &story.feature_image {
                            img src=(image) alt=(story.title);
                        }
                        h2 { (story.title) }
                    }
                    p.excerpt { (story.excerpt) }
                    (article_meta(story))
                }
            }
            @if rest.is_empty() && featured.is_none() {
                p.empty { "No articles yet." }
            } @else if !rest.is_empty() {
                section.latest {
                    h2 { "Latest" }
                    (article_list(&rest))
                }
            }
        }
    };

    base_document("", site, Some("index"), None, content)
}

/// Renders a single article with its outline and related articles
pub fn render_article_page(article: &Article, related: &[Article], site: &SiteConfig) -> Markup {
    let related: Vec<&Article> = related
        .iter()
        .filter(|a| a.slug != article.slug)
        .take(RELATED_LIMIT)
        .collect();

    let content = html! {
        main {
            article.article-page {
                (outline(&article.sections))
                div.article-main {
                    header.article-header {
                        h1 { (article.title) }
                        (tag_list(article))
                        (article_meta(article))
                    }
                    @if let Some(image) = &article.feature_image {
                        figure.article-hero {
                            img src=(image) alt=(article.title);
                        }
                    }
                    div.article-body {
                        (PreEscaped(&article.content))
                    }
                    aside.byline {
                        @if let Some(portrait) = &article.author.profile_image {
                            img src=(portrait) alt=(article.author.name);
                        }
                        p.author { (article.author.name) }
                        @if !article.author.bio.is_empty() {
                            p.bio { (article.author.bio) }
                        }
                    }
                }
            }
            @if !related.is_empty() {
                section.related {
                    h2 { "Related" }
                    (article_list(&related))
                }
            }
        }
    };

    base_document(&article.title, site, Some("article"), None, content)
}

/// Renders a category landing page
pub fn render_category_page(
    category: &CategoryConfig,
    articles: &[Article],
    site: &SiteConfig,
) -> Markup {
    let listed: Vec<&Article> = articles.iter().collect();
    let content = html! {
        main.category-page {
            header.category-hero {
                h1 { (category.title) }
                @if !category.description.is_empty() {
                    p { (category.description) }
                }
            }
            @if listed.is_empty() {
                p.empty { "Nothing here yet." }
            } @else {
                (article_list(&listed))
            }
        }
    };

    base_document(
        &category.title,
        site,
        Some("category"),
        Some(&category.slug),
        content,
    )
}

pub fn not_found_page(site: &SiteConfig) -> Markup {
    let content = html! {
        main.not-found {
            h1 { "Page Not Found" }
            p { "The page you're looking for doesn't exist or has been moved." }
            a href="/" { "Return to Home" }
        }
    };
    base_document("Page Not Found", site, Some("not-found"), None, content)
}

// ============================================================================
// Tests
// ============================================================================
