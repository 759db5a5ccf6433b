//! CLI output formatting.
//!
//! # Entity Display Contract
//!
//! Every entity prints as a header line (positional index + title) followed
//! by indented context lines:
//!
//! ```text
//! Articles (file)
//! 001 Australia's Climate Policy Faces New Challenges
//!     Slug: climate-policy
//!     Sarah Mitchell · 15 March 2024 · 3 min read
//!     Tags: Climate Policy, Politics
//! ```
//!
//! A single article adds its excerpt and body outline:
//!
//! ```text
//! Australia's Climate Policy Faces New Challenges
//!     Slug: climate-policy
//!     Author: Sarah Mitchell
//!     Published: 15 March 2024
//!     Reading time: 3 min
//!     Tags: Climate Policy, Politics
//!     Image: /images/articles/parliament.jpg
//!     Excerpt: As global temperatures continue to rise...
//!
//! Outline
//!     International Pressure Mounts
//!         Trade Partners
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::render::{BuildSummary, format_date};
use crate::types::{Article, Author, Tag};
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn entity_header(index: usize, title: &str) -> String {
    format!("{} {}", format_index(index), title)
}

fn tag_names(tags: &[Tag]) -> String {
    tags.iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `Sarah Mitchell · 15 March 2024 · 3 min read`
fn byline(article: &Article) -> String {
    format!(
        "{} · {} · {} min read",
        article.author.name,
        format_date(&article.published_at),
        article.reading_time
    )
}

// ============================================================================
// Articles
// ============================================================================

pub fn format_article_list(heading: &str, articles: &[Article]) -> Vec<String> {
    let mut lines = vec![heading.to_string()];
    if articles.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
        return lines;
    }
    for (i, article) in articles.iter().enumerate() {
        lines.push(entity_header(i + 1, &article.title));
        lines.push(format!("{}Slug: {}", indent(1), article.slug));
        lines.push(format!("{}{}", indent(1), byline(article)));
        if !article.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(1), tag_names(&article.tags)));
        }
    }
    lines
}

pub fn print_article_list(heading: &str, articles: &[Article]) {
    for line in format_article_list(heading, articles) {
        println!("{}", line);
    }
}

pub fn format_article(article: &Article) -> Vec<String> {
    let mut lines = vec![
        article.title.clone(),
        format!("{}Slug: {}", indent(1), article.slug),
        format!("{}Author: {}", indent(1), article.author.name),
        format!(
            "{}Published: {}",
            indent(1),
            format_date(&article.published_at)
        ),
        format!("{}Reading time: {} min", indent(1), article.reading_time),
    ];
    if !article.tags.is_empty() {
        lines.push(format!("{}Tags: {}", indent(1), tag_names(&article.tags)));
    }
    if let Some(image) = &article.feature_image {
        lines.push(format!("{}Image: {}", indent(1), image));
    }
    if !article.excerpt.is_empty() {
        lines.push(format!("{}Excerpt: {}", indent(1), article.excerpt));
    }

    if !article.sections.is_empty() {
        lines.push(String::new());
        lines.push("Outline".to_string());
        for section in &article.sections {
            lines.push(format!("{}{}", indent(1), section.title));
            for sub in &section.subsections {
                lines.push(format!("{}{}", indent(2), sub.title));
            }
        }
    }
    lines
}

pub fn print_article(article: &Article) {
    for line in format_article(article) {
        println!("{}", line);
    }
}

// ============================================================================
// Authors and tags
// ============================================================================

pub fn format_authors(authors: &[Author]) -> Vec<String> {
    let mut lines = vec!["Authors".to_string()];
    for (i, author) in authors.iter().enumerate() {
        lines.push(entity_header(i + 1, &author.name));
        if !author.bio.is_empty() {
            lines.push(format!("{}Bio: {}", indent(1), author.bio));
        }
        if let Some(image) = &author.profile_image {
            lines.push(format!("{}Image: {}", indent(1), image));
        }
    }
    lines
}

pub fn print_authors(authors: &[Author]) {
    for line in format_authors(authors) {
        println!("{}", line);
    }
}

pub fn format_tags(tags: &[Tag]) -> Vec<String> {
    let mut lines = vec!["Tags".to_string()];
    for (i, tag) in tags.iter().enumerate() {
        lines.push(format!("{} ({})", entity_header(i + 1, &tag.name), tag.slug));
        if !tag.description.is_empty() {
            lines.push(format!("{}{}", indent(1), tag.description));
        }
    }
    lines
}

pub fn print_tags(tags: &[Tag]) {
    for line in format_tags(tags) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_summary(summary: &BuildSummary, out_dir: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Generated {} article pages, {} category pages",
        summary.articles, summary.categories
    )];
    if summary.skipped > 0 {
        lines.push(format!(
            "{}Skipped {} articles with unusable slugs",
            indent(1),
            summary.skipped
        ));
    }
    lines.push(format!("Site generated at {}", out_dir.display()));
    lines
}

pub fn print_build_summary(summary: &BuildSummary, out_dir: &Path) {
    for line in format_build_summary(summary, out_dir) {
        println!("{}", line);
    }
}
