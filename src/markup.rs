//! Rich-text rendering for article bodies.
//!
//! File-store articles are written in Markdoc, a Markdown superset. The
//! Markdown part is rendered with pulldown-cmark; Markdoc's `{% tag %}`
//! annotations have no meaning outside the editor and are dropped. Hosted
//! posts arrive as HTML already, so only the outline pass applies to them.
//!
//! Both paths produce a [`RenderedBody`]: HTML whose `h2`/`h3` headings carry
//! stable `id` anchors, plus the [`Section`] outline built from those
//! headings. A reader view uses the outline for its table of contents and
//! active-section tracking.
//!
//! ## Sanitizing
//!
//! Raw HTML blocks and inline HTML in a Markdown source are emitted as
//! escaped text, never passed through. The body a page receives is therefore
//! safe to insert without further escaping.

use crate::naming::slugify;
use crate::text::strip_markup;
use crate::types::{Section, Subsection};
use pulldown_cmark::{
    CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, TextMergeStream, html,
};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static MARKDOC_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{%.*?%\}").expect("markdoc pattern is valid"));

static HTML_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<h([23])([^>]*)>(.*?)</h[23]>").expect("heading pattern is valid")
});

static ID_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:^|\s)id\s*=\s*"([^"]*)""#).expect("id pattern is valid"));

/// Rendered article body with its heading outline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedBody {
    pub html: String,
    pub sections: Vec<Section>,
}

/// Render a Markdoc/Markdown source to sanitized HTML with heading anchors.
pub fn render_markdown(source: &str) -> RenderedBody {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_HEADING_ATTRIBUTES;

    let mut events: Vec<Event> = Vec::new();
    let mut ids = AnchorIds::default();
    let mut outline = Outline::default();
    let mut in_code = false;
    let mut paragraph_start: Option<usize> = None;
    let mut heading: Option<(usize, HeadingLevel, String)> = None;

    // Merged text keeps a `{% ... %}` run inside a single event.
    for event in TextMergeStream::new(Parser::new_ext(source, options)) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => {
                in_code = true;
                events.push(event);
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code = false;
                events.push(event);
            }
            Event::Html(raw) | Event::InlineHtml(raw) => {
                events.push(Event::Text(raw));
            }
            Event::Text(text) if !in_code && text.contains("{%") => {
                let kept = MARKDOC_TAG.replace_all(&text, "").into_owned();
                if let Some((_, _, title)) = heading.as_mut() {
                    title.push_str(&kept);
                }
                if !kept.is_empty() {
                    events.push(Event::Text(CowStr::from(kept)));
                }
            }
            Event::Start(Tag::Paragraph) => {
                paragraph_start = Some(events.len());
                events.push(event);
            }
            Event::End(TagEnd::Paragraph) => {
                // A paragraph that held only Markdoc tags renders to nothing.
                if let Some(start) = paragraph_start.take()
                    && events[start + 1..].iter().all(is_blank)
                {
                    events.truncate(start);
                    continue;
                }
                events.push(event);
            }
            Event::Start(Tag::Heading { level, .. }) => {
                heading = Some((events.len(), level, String::new()));
                events.push(event);
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((start, level, title)) = heading.take() {
                    let title = title.trim().to_string();
                    let id = match &events[start] {
                        Event::Start(Tag::Heading { id: Some(given), .. }) => {
                            ids.reserve(given)
                        }
                        _ => ids.assign(&title),
                    };
                    if let Event::Start(Tag::Heading { id: slot, .. }) = &mut events[start] {
                        *slot = Some(CowStr::from(id.clone()));
                    }
                    outline.push(level, id, title);
                }
                events.push(event);
            }
            Event::Text(ref text) | Event::Code(ref text) => {
                if let Some((_, _, title)) = heading.as_mut() {
                    title.push_str(text);
                }
                events.push(event);
            }
            other => events.push(other),
        }
    }

    let mut body = String::new();
    html::push_html(&mut body, events.into_iter());
    RenderedBody {
        html: body,
        sections: outline.finish(),
    }
}

/// Anchor the `h2`/`h3` headings of already-rendered HTML and build its
/// outline. Headings that already carry an `id` keep it.
pub fn outline_html(source: &str) -> RenderedBody {
    let mut ids = AnchorIds::default();
    let mut outline = Outline::default();

    let html = HTML_HEADING.replace_all(source, |caps: &Captures| {
        let level = if &caps[1] == "2" {
            HeadingLevel::H2
        } else {
            HeadingLevel::H3
        };
        let attrs = &caps[2];
        let inner = &caps[3];
        let title = strip_markup(inner).trim().to_string();

        match ID_ATTR.captures(attrs) {
            Some(existing) => {
                let id = ids.reserve(&existing[1]);
                outline.push(level, id, title);
                caps[0].to_string()
            }
            None => {
                let id = ids.assign(&title);
                outline.push(level, id.clone(), title);
                format!("<h{n} id=\"{id}\"{attrs}>{inner}</h{n}>", n = &caps[1])
            }
        }
    });

    RenderedBody {
        html: html.into_owned(),
        sections: outline.finish(),
    }
}

fn is_blank(event: &Event) -> bool {
    match event {
        Event::Text(text) => text.trim().is_empty(),
        Event::SoftBreak | Event::HardBreak => true,
        _ => false,
    }
}

/// Hands out unique heading anchors within one document.
#[derive(Default)]
struct AnchorIds {
    seen: HashMap<String, usize>,
}

impl AnchorIds {
    /// Slug of `title`, suffixed `-2`, `-3`… on repeats.
    fn assign(&mut self, title: &str) -> String {
        let base = match slugify(title) {
            s if s.is_empty() => "section".to_string(),
            s => s,
        };
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            let id = format!("{base}-{count}");
            self.seen.insert(id.clone(), 1);
            id
        }
    }

    /// Record an author-supplied id verbatim.
    fn reserve(&mut self, id: &str) -> String {
        *self.seen.entry(id.to_string()).or_insert(0) += 1;
        id.to_string()
    }
}

#[derive(Default)]
struct Outline {
    sections: Vec<Section>,
}

impl Outline {
    fn push(&mut self, level: HeadingLevel, id: String, title: String) {
        match level {
            HeadingLevel::H2 => self.sections.push(Section {
                id,
                title,
                subsections: Vec::new(),
            }),
            HeadingLevel::H3 => match self.sections.last_mut() {
                Some(section) => section.subsections.push(Subsection { id, title }),
                // An h3 before any h2 stands on its own.
                None => self.sections.push(Section {
                    id,
                    title,
                    subsections: Vec::new(),
                }),
            },
            _ => {}
        }
    }

    fn finish(self) -> Vec<Section> {
        self.sections
    }
}
