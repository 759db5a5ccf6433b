//! Plain-text derivations from rendered article content.
//!
//! Both adapters hand these functions the final HTML of an article body and
//! get back the two derived fields every view model carries:
//!
//! - **Excerpt**: markup stripped, bounded to [`DEFAULT_EXCERPT_LENGTH`]
//!   characters, truncated on a word boundary with a trailing `...`.
//! - **Reading time**: whitespace-separated word count divided by
//!   [`WORDS_PER_MINUTE`], rounded up, never below one minute.
//!
//! Markup removal is deliberately pattern-based (`<...>` runs are dropped)
//! rather than a full HTML parse: the input is always HTML this crate or the
//! hosted CMS produced, never arbitrary user markup.

use regex::Regex;
use std::sync::LazyLock;

/// Default excerpt bound, in characters of plain text.
pub const DEFAULT_EXCERPT_LENGTH: usize = 200;

/// Reading speed used for reading-time estimates.
pub const WORDS_PER_MINUTE: u32 = 200;

/// Marker appended to truncated excerpts.
pub const ELLIPSIS: &str = "...";

// An unterminated `<` swallows the rest of the input.
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>?").expect("tag pattern is valid"));

/// Remove markup tags and decode the entities the renderer emits for text.
///
/// `&lt;` and `&gt;` are left encoded so the result can never reintroduce a
/// tag.
pub fn strip_markup(content: &str) -> String {
    let stripped = TAG_PATTERN.replace_all(content, "");
    stripped
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Build a bounded plain-text excerpt from rich content.
///
/// Text at or under `max_len` characters is returned unchanged. Longer text is
/// cut at the last whitespace at or before `max_len` and gets [`ELLIPSIS`]
/// appended; a single word longer than the bound is cut hard.
pub fn generate_excerpt(content: &str, max_len: usize) -> String {
    let plain = strip_markup(content);
    if plain.chars().count() <= max_len {
        return plain;
    }

    let cut = plain
        .char_indices()
        .nth(max_len)
        .map(|(idx, _)| idx)
        .unwrap_or(plain.len());
    let window = &plain[..cut];

    // Window already ends on a word boundary when the next char is whitespace.
    let next_is_space = plain[cut..].starts_with(char::is_whitespace);
    let kept = if next_is_space {
        window
    } else {
        match window.rfind(char::is_whitespace) {
            Some(pos) => &window[..pos],
            None => window,
        }
    };

    format!("{}{}", kept.trim_end(), ELLIPSIS)
}

/// Number of whitespace-separated words once markup is removed.
pub fn word_count(content: &str) -> usize {
    strip_markup(content).split_whitespace().count()
}

/// Estimated reading time in whole minutes at [`WORDS_PER_MINUTE`].
pub fn calculate_reading_time(content: &str) -> u32 {
    reading_time_at(content, WORDS_PER_MINUTE)
}

/// Estimated reading time in whole minutes at a given reading speed.
///
/// Rounds up and never returns less than 1, even for empty content.
pub fn reading_time_at(content: &str, words_per_minute: u32) -> u32 {
    let words = word_count(content) as u64;
    let wpm = u64::from(words_per_minute.max(1));
    let minutes = words.div_ceil(wpm);
    u32::try_from(minutes).unwrap_or(u32::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    // =========================================================================
    // strip_markup
    // =========================================================================

    #[test]
    fn strip_removes_tags() {
        assert_eq!(
            strip_markup("<p>Hello <strong>world</strong></p>"),
            "Hello world"
        );
    }

    #[test]
    fn strip_unterminated_tag_drops_rest() {
        assert_eq!(strip_markup("Budget <a href=\"x"), "Budget ");
    }

    #[test]
    fn strip_decodes_text_entities() {
        assert_eq!(strip_markup("Tom &amp; Jerry&#39;s"), "Tom & Jerry's");
    }

    #[test]
    fn strip_keeps_angle_entities_encoded() {
        assert_eq!(strip_markup("&lt;b&gt;"), "&lt;b&gt;");
    }

    // =========================================================================
    // generate_excerpt
    // =========================================================================

    #[test]
    fn short_plain_text_is_identity() {
        let text = "Australia finds itself at a critical juncture.";
        assert_eq!(generate_excerpt(text, DEFAULT_EXCERPT_LENGTH), text);
    }

    #[test]
    fn text_exactly_at_bound_is_identity() {
        let text = "a".repeat(200);
        assert_eq!(generate_excerpt(&text, 200), text);
    }

    #[test]
    fn excerpt_never_contains_markup() {
        let html = "<h2>Heading</h2><p>Body <em>text</em> here.</p>";
        let excerpt = generate_excerpt(html, 200);
        assert!(!excerpt.contains('<'));
        assert_eq!(excerpt, "HeadingBody text here.");
    }

    #[test]
    fn long_text_truncated_on_word_boundary() {
        let text = "alpha beta gamma delta";
        // Window "alpha beta ga" ends mid-word → back off to "alpha beta".
        assert_eq!(generate_excerpt(text, 13), "alpha beta...");
    }

    #[test]
    fn window_ending_at_word_end_keeps_last_word() {
        let text = "alpha beta gamma delta";
        assert_eq!(generate_excerpt(text, 10), "alpha beta...");
    }

    #[test]
    fn single_long_word_cut_hard() {
        let text = "x".repeat(50);
        assert_eq!(generate_excerpt(&text, 10), format!("{}...", "x".repeat(10)));
    }

    #[test]
    fn truncated_excerpt_respects_bound() {
        let text = words(100);
        let excerpt = generate_excerpt(&text, 200);
        let body = excerpt.strip_suffix(ELLIPSIS).unwrap();
        assert!(body.chars().count() <= 200);
        assert!(body.ends_with("word"));
    }

    #[test]
    fn bound_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        assert_eq!(generate_excerpt(&text, 10), text);
    }

    #[test]
    fn truncation_never_splits_a_word() {
        let text = "The transition to renewable energy presents both opportunities and challenges";
        for bound in 5..text.len() {
            let excerpt = generate_excerpt(text, bound);
            let body = excerpt.strip_suffix(ELLIPSIS).unwrap();
            let last = body.split_whitespace().last().unwrap();
            assert!(
                text.split_whitespace().any(|w| w == last),
                "bound {bound} produced partial word {last:?}"
            );
        }
    }

    // =========================================================================
    // Reading time
    // =========================================================================

    #[test]
    fn empty_content_reads_in_one_minute() {
        assert_eq!(calculate_reading_time(""), 1);
    }

    #[test]
    fn short_content_reads_in_one_minute() {
        assert_eq!(calculate_reading_time("<p>Just a few words.</p>"), 1);
    }

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(calculate_reading_time(&words(200)), 1);
        assert_eq!(calculate_reading_time(&words(201)), 2);
        assert_eq!(calculate_reading_time(&words(1000)), 5);
    }

    #[test]
    fn reading_time_ignores_markup() {
        let html = format!("<p>{}</p><p>{}</p>", words(150), words(150));
        assert_eq!(calculate_reading_time(&html), 2);
    }

    #[test]
    fn reading_time_is_monotonic() {
        let mut previous = 0;
        for n in (0..2000).step_by(37) {
            let minutes = calculate_reading_time(&words(n));
            assert!(minutes >= previous);
            assert!(minutes >= 1);
            previous = minutes;
        }
    }

    #[test]
    fn custom_reading_speed() {
        assert_eq!(reading_time_at(&words(300), 100), 3);
        assert_eq!(reading_time_at(&words(10), 0), 10);
    }
}
