//! # Broadsheet
//!
//! Content access layer for a news and analysis site. Articles come from one
//! of two interchangeable sources and are normalized into one view model that
//! page code renders without knowing where it came from.
//!
//! # Architecture: Two Adapters, One Model
//!
//! ```text
//! content/ (YAML + Markdoc)  ──  store::FileStore    ─┐
//!                                                     ├─→  Article  →  render
//! Content API (JSON)         ──  hosted::HostedClient ─┘
//! ```
//!
//! Both adapters implement [`source::ContentSource`]. Exactly one is active
//! per process, selected by `source` in `broadsheet.toml`.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Normalized view models: `Article`, `Author`, `Tag`, outline sections |
//! | [`text`] | Markup stripping, bounded excerpts, reading-time estimates |
//! | [`image`] | Image reference normalization against a base path |
//! | [`naming`] | Entry slugs from file names and URL-safe heading slugs |
//! | [`markup`] | Markdoc/Markdown → sanitized HTML with heading anchors and outline |
//! | [`store`] | File-based adapter: reads articles, authors, tags from disk |
//! | [`hosted`] | Hosted adapter: Content API client and `Post` → `Article` projection |
//! | [`source`] | The `ContentSource` seam and adapter selection from config |
//! | [`render`] | Maud page templates and static preview builds |
//! | [`config`] | `broadsheet.toml` loading, validation, merging, env overrides |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Degrade, Don't Fail
//!
//! Configuration errors are the only fatal errors: a missing or malformed
//! hosted key stops startup before any request is made. Everything after that
//! degrades. A missing author becomes "Unknown Author", an unresolvable tag is
//! dropped, an unreachable API yields an empty list. Each degradation is
//! logged through `tracing` with enough context to find the bad record.
//!
//! ## Plain-Text Excerpts
//!
//! Excerpts are always derived through [`text::generate_excerpt`], including
//! authored ones, so every excerpt is markup-free and bounded regardless of
//! its source.
//!
//! ## Filenames Are Slugs
//!
//! A file-store entry's slug is its file name, exactly as the editor wrote
//! it, so `5-things-to-know` and `10-things-to-know` never collide. Entries
//! are ordered by slug and the first article in that order is the featured
//! one.

pub mod config;
pub mod hosted;
pub mod image;
pub mod markup;
pub mod naming;
pub mod output;
pub mod render;
pub mod source;
pub mod store;
pub mod text;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
