//! Autocomplete candidates and how they are written into the prompt.

use std::sync::OnceLock;

use regex::Regex;

use super::word::{Terminator, word_span};
use crate::constants::{SUGGESTION_BOX_EXTRA_WIDTH, SUGGESTION_BOX_MAX_WIDTH, char_width};
use crate::text_core::trim_with_cursor;

fn bold_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<b>(.*?)</b>").expect("bold regex is valid"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("html tag regex is valid"))
}

fn frequency_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s\(\d+\)$").expect("frequency regex is valid"))
}

/// One autocomplete candidate as delivered by the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionItem {
    /// HTML-annotated display string, e.g. `<b>1girl</b> (12345)`
    pub markup: String,
    /// Lookup key: the bolded part, else everything before the first colon
    pub value: String,
}

impl SuggestionItem {
    pub fn from_markup(markup: impl Into<String>) -> Self {
        let markup = markup.into();
        let value = match bold_regex().captures(&markup).and_then(|c| c.get(1)) {
            Some(bold) => bold.as_str().to_string(),
            None => markup.split(':').next().unwrap_or_default().trim().to_string(),
        };
        Self { markup, value }
    }

    /// Display text with HTML tags removed.
    pub fn plain_text(&self) -> String {
        tag_regex().replace_all(&self.markup, "").into_owned()
    }
}

/// Width of the suggestion box for `items`, estimated from character width.
pub fn box_width(items: &[SuggestionItem], font_size: f32) -> f32 {
    let widest = items
        .iter()
        .map(|item| item.plain_text().chars().count())
        .max()
        .unwrap_or(0);
    (widest as f32 * char_width(font_size) + SUGGESTION_BOX_EXTRA_WIDTH).min(SUGGESTION_BOX_MAX_WIDTH)
}

/// Turn a tag name into prompt text.
///
/// Drops a trailing ` (12345)` frequency count, turns underscores into
/// spaces, escapes parentheses and, unless the tag starts with ':', turns
/// colons into spaces.
pub fn format_suggestion(suggestion: &str) -> String {
    let without_count = frequency_regex().replace(suggestion, "");
    let formatted = without_count
        .replace('_', " ")
        .replace('(', "\\(")
        .replace(')', "\\)");
    if formatted.starts_with(':') {
        formatted
    } else {
        formatted.replace(':', " ")
    }
}

/// Text inserted for a raw candidate string.
pub fn canonical_text(candidate: &str) -> String {
    if let Some(bold) = bold_regex().captures(candidate).and_then(|c| c.get(1)) {
        return format_suggestion(bold.as_str());
    }
    if candidate.starts_with(':') {
        return candidate.trim().to_string();
    }
    format_suggestion(candidate.split(':').next().unwrap_or_default().trim())
}

/// Result of writing a candidate into the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedSuggestion {
    pub text: String,
    pub cursor: usize,
    /// Canonical text that replaced the word
    pub inserted: String,
    /// Separator appended after the inserted text
    pub suffix: &'static str,
}

fn suffix_for(terminator: Terminator) -> &'static str {
    match terminator {
        Terminator::Comma => "",
        Terminator::ImmediateNewline | Terminator::Newline => ",",
        Terminator::EndOfText => ", ",
    }
}

/// Replace the word under `cursor` with `candidate`.
///
/// A space is put in front unless the word starts a line. The caret lands
/// after the inserted text, past the comma when a suffix was added. The
/// whole value is trimmed afterwards.
pub fn apply_suggestion(text: &str, cursor: usize, candidate: &str) -> AppliedSuggestion {
    let inserted = canonical_text(candidate);
    let span = word_span(text, cursor);
    let suffix = suffix_for(span.terminator);
    let prefix = if span.starts_line(text) { "" } else { " " };

    let mut value = String::with_capacity(text.len() + inserted.len() + 3);
    value.push_str(&text[..span.start]);
    value.push_str(prefix);
    value.push_str(&inserted);
    value.push_str(suffix);
    value.push_str(&text[span.end..]);

    let comma = usize::from(suffix.starts_with(','));
    let caret = span.start + prefix.len() + inserted.len() + comma;
    let (text, cursor) = trim_with_cursor(&value, caret);

    AppliedSuggestion {
        text,
        cursor,
        inserted,
        suffix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_value() {
        assert_eq!(SuggestionItem::from_markup("<b>1girl</b> (12345)").value, "1girl");
        assert_eq!(SuggestionItem::from_markup("blue_sky: 0.9").value, "blue_sky");
        assert_eq!(
            SuggestionItem::from_markup("<b>1girl</b> (12345)").plain_text(),
            "1girl (12345)"
        );
    }

    #[test]
    fn test_format_suggestion() {
        assert_eq!(format_suggestion("long_hair (5000)"), "long hair");
        assert_eq!(format_suggestion("fate_(series)"), "fate \\(series\\)");
        assert_eq!(format_suggestion("a:b"), "a b");
        assert_eq!(format_suggestion(":d"), ":d");
    }

    #[test]
    fn test_canonical_text() {
        assert_eq!(canonical_text("<b>hatsune_miku</b> (999)"), "hatsune miku");
        assert_eq!(canonical_text(":3 "), ":3");
        assert_eq!(canonical_text("solo: 12"), "solo");
    }

    #[test]
    fn test_apply_at_empty_line_start() {
        let applied = apply_suggestion("1gi", 3, "<b>1girl</b> (12345)");
        assert_eq!(applied.inserted, "1girl");
        assert_eq!(applied.suffix, ", ");
        assert_eq!(applied.text, "1girl,");
        assert_eq!(applied.cursor, 6);
    }

    #[test]
    fn test_apply_before_comma() {
        let applied = apply_suggestion("a, blu, c", 6, "<b>blue_sky</b>");
        assert_eq!(applied.text, "a, blue sky, c");
        assert_eq!(applied.suffix, "");
        assert_eq!(applied.cursor, 11);
    }

    #[test]
    fn test_apply_before_newline() {
        let applied = apply_suggestion("a, blu\nnext", 6, "<b>blue</b>");
        assert_eq!(applied.text, "a, blue,\nnext");
        assert_eq!(applied.cursor, 8);

        // Newline further on, no comma in between
        let applied = apply_suggestion("a, bl\nx, y", 4, "<b>blue</b>");
        assert_eq!(applied.text, "a, blue,\nx, y");
    }

    #[test]
    fn test_apply_mid_text() {
        let applied = apply_suggestion("red, gre", 8, "<b>green</b>");
        assert_eq!(applied.text, "red, green,");
        assert_eq!(applied.cursor, 11);
    }

    #[test]
    fn test_box_width() {
        let items = vec![
            SuggestionItem::from_markup("<b>ab</b>"),
            SuggestionItem::from_markup("<b>abcd</b>"),
        ];
        // 4 chars * 6px + 20
        assert!((box_width(&items, 10.0) - 44.0).abs() < 0.001);

        let long = vec![SuggestionItem::from_markup("x".repeat(200))];
        assert_eq!(box_width(&long, 10.0), SUGGESTION_BOX_MAX_WIDTH);
    }
}
