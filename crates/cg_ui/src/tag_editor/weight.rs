//! Ctrl+Arrow weight adjustment for `(tag:weight)` spans.

use std::sync::OnceLock;

use regex::Regex;

use super::TextEdit;
use crate::constants::{DEFAULT_WEIGHT, WEIGHT_MAX, WEIGHT_MIN, WEIGHT_STEP, format_weight, round_weight};
use crate::text_core::{clamp_to_char_boundary, non_empty_selection};

fn bracketed_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^()]+:\d*\.?\d+)\)").expect("bracketed tag regex is valid"))
}

fn weighted_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\((.+):(\d*\.?\d+)\)$").expect("weighted tag regex is valid"))
}

/// Split `(text:weight)` into its parts. Bare text carries the default weight.
pub fn parse_weighted(tag: &str) -> (&str, f64) {
    if let Some(caps) = weighted_regex().captures(tag) {
        if let (Some(text), Some(weight)) = (caps.get(1), caps.get(2)) {
            if let Ok(weight) = weight.as_str().parse::<f64>() {
                return (text.as_str(), weight);
            }
        }
    }
    (tag, DEFAULT_WEIGHT)
}

/// First `(text:weight)` span that contains the caret, ends included.
fn bracketed_at(text: &str, cursor: usize) -> Option<(usize, usize)> {
    bracketed_regex()
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .find(|(start, end)| *start <= cursor && cursor <= *end)
}

/// Separator-delimited word around the caret, narrowed to its trimmed content.
fn word_at(text: &str, cursor: usize) -> (usize, usize) {
    let (before, after) = text.split_at(cursor);
    let start = before.rfind([',', '\n']).map(|i| i + 1).unwrap_or(0);
    let end = after.find([',', '\n']).map(|i| cursor + i).unwrap_or(text.len());

    let raw = &text[start..end];
    let lead = raw.len() - raw.trim_start().len();
    let trimmed_len = raw.trim().len();
    (start + lead, start + lead + trimmed_len)
}

/// Raise or lower the weight of the tag targeted by `selection`.
///
/// The target is the selection when it is non-empty, else a `(text:weight)`
/// span containing the caret, else the comma/newline-delimited word. Returns
/// `None` when there is no target or the new weight would leave
/// `[WEIGHT_MIN, WEIGHT_MAX]`.
pub fn adjust_weight(text: &str, selection: (usize, usize), increase: bool) -> Option<TextEdit> {
    let (start, end) = match non_empty_selection(Some(selection)) {
        Some((s, e)) => (clamp_to_char_boundary(text, s), clamp_to_char_boundary(text, e)),
        None => {
            let cursor = clamp_to_char_boundary(text, selection.0);
            bracketed_at(text, cursor).unwrap_or_else(|| word_at(text, cursor))
        }
    };

    let target = &text[start..end];
    if target.is_empty() {
        return None;
    }

    let (tag, weight) = parse_weighted(target);
    let delta = if increase { WEIGHT_STEP } else { -WEIGHT_STEP };
    let weight = round_weight(weight + delta);
    if !(WEIGHT_MIN..=WEIGHT_MAX).contains(&weight) {
        log::debug!("[tag_editor] weight {} out of range, ignoring", weight);
        return None;
    }

    let new_tag = if weight == DEFAULT_WEIGHT {
        tag.to_string()
    } else {
        format!("({}:{})", tag, format_weight(weight))
    };

    let mut new_text = String::with_capacity(text.len() + 8);
    new_text.push_str(&text[..start]);
    new_text.push_str(&new_tag);
    new_text.push_str(&text[end..]);

    Some(TextEdit {
        text: new_text,
        cursor: start + new_tag.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str, cursor: usize, increase: bool) -> Option<TextEdit> {
        adjust_weight(text, (cursor, cursor), increase)
    }

    #[test]
    fn test_bracketed_increase() {
        let text = "a, (red hair:1.0), blue";
        let edit = at(text, 7, true).unwrap();
        assert_eq!(edit.text, "a, (red hair:1.05), blue");
        assert_eq!(edit.cursor, 18);
    }

    #[test]
    fn test_bare_word_keeps_spacing() {
        let edit = at("a, blue, c", 5, true).unwrap();
        assert_eq!(edit.text, "a, (blue:1.05), c");
        assert_eq!(edit.cursor, 14);
    }

    #[test]
    fn test_down_from_105_strips_parens() {
        let edit = at("(cat:1.05)", 3, false).unwrap();
        assert_eq!(edit.text, "cat");
        assert_eq!(edit.cursor, 3);
    }

    #[test]
    fn test_bounds_are_no_ops() {
        assert_eq!(at("(cat:3)", 2, true), None);
        assert_eq!(at("(cat:0)", 2, false), None);
        assert_eq!(at("(cat:0.05)", 2, false).unwrap().text, "(cat:0)");
        assert_eq!(at("(cat:2.95)", 2, true).unwrap().text, "(cat:3)");
    }

    #[test]
    fn test_five_up_five_down_round_trip() {
        let mut edit = TextEdit {
            text: "dog".to_string(),
            cursor: 1,
        };
        for _ in 0..5 {
            edit = adjust_weight(&edit.text, (1, 1), true).unwrap();
        }
        assert_eq!(edit.text, "(dog:1.25)");
        for _ in 0..5 {
            edit = adjust_weight(&edit.text, (2, 2), false).unwrap();
        }
        assert_eq!(edit.text, "dog");
    }

    #[test]
    fn test_selection_target() {
        let text = "a big cat";
        let edit = adjust_weight(text, (6, 2), false).unwrap();
        assert_eq!(edit.text, "a (big :0.95)cat");
    }

    #[test]
    fn test_empty_target() {
        assert_eq!(at("a, , b", 3, true), None);
        assert_eq!(at("", 0, true), None);
    }

    #[test]
    fn test_parse_weighted() {
        assert_eq!(parse_weighted("(a:b:1.2)"), ("a:b", 1.2));
        assert_eq!(parse_weighted("(x:.5)"), ("x", 0.5));
        assert_eq!(parse_weighted("plain"), ("plain", 1.0));
    }
}
