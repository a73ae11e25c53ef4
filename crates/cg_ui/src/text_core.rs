//! Shared text editing utilities for text inputs
//!
//! Offsets handled here are byte offsets into a `String`. The browser reports
//! caret positions in UTF-16 code units, so the conversion helpers below are
//! used at the DOM boundary.

use crate::constants::{char_width, line_height};

// =============================================================================
// Offset Conversion
// =============================================================================

/// Clamp `index` to the text length and move it back onto a char boundary.
pub fn clamp_to_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Convert a UTF-16 code unit offset to a byte offset.
///
/// Offsets past the end clamp to `text.len()`. An offset that lands between
/// the two halves of a surrogate pair resolves to the start of that char.
pub fn utf16_to_byte(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (byte_idx, ch) in text.char_indices() {
        let next = units + ch.len_utf16();
        if next > utf16_offset {
            return byte_idx;
        }
        units = next;
    }
    text.len()
}

/// Convert a byte offset to a UTF-16 code unit offset.
pub fn byte_to_utf16(text: &str, byte_offset: usize) -> usize {
    let byte_offset = clamp_to_char_boundary(text, byte_offset);
    text[..byte_offset].encode_utf16().count()
}

// =============================================================================
// Selection Helpers
// =============================================================================

/// Normalize a selection range so start <= end
#[inline]
pub fn normalize_selection(selection: (usize, usize)) -> (usize, usize) {
    let (start, end) = selection;
    (start.min(end), start.max(end))
}

/// A selection is only meaningful when it spans at least one byte
#[inline]
pub fn non_empty_selection(selection: Option<(usize, usize)>) -> Option<(usize, usize)> {
    selection
        .map(normalize_selection)
        .filter(|(start, end)| start < end)
}

// =============================================================================
// Text Manipulation
// =============================================================================

/// Trim surrounding whitespace and shift `cursor` by the amount removed in
/// front of it.
pub fn trim_with_cursor(text: &str, cursor: usize) -> (String, usize) {
    let leading = text.len() - text.trim_start().len();
    let trimmed = text.trim().to_string();
    let cursor = cursor.saturating_sub(leading).min(trimmed.len());
    (trimmed, cursor)
}

// =============================================================================
// Caret Geometry
// =============================================================================

/// Estimate the caret position inside a wrapping text box.
///
/// Lines are split on `\n` and soft-wrapped at `box_width` using the
/// approximate character width. Returns `(x, y)` relative to the content area
/// origin, where `y` is the top of the caret's line.
pub fn caret_offset(text: &str, cursor: usize, font_size: f32, box_width: f32) -> (f32, f32) {
    let cursor = clamp_to_char_boundary(text, cursor);
    let cw = char_width(font_size);
    let per_line = if cw > 0.0 {
        ((box_width / cw).floor() as usize).max(1)
    } else {
        usize::MAX
    };

    let before = &text[..cursor];
    let mut visual_lines = 0usize;
    let mut column = 0usize;
    for (i, line) in before.split('\n').enumerate() {
        let chars = line.chars().count();
        if i > 0 {
            visual_lines += 1;
        }
        visual_lines += chars / per_line;
        column = chars % per_line;
    }

    (column as f32 * cw, visual_lines as f32 * line_height(font_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_selection() {
        assert_eq!(normalize_selection((5, 2)), (2, 5));
        assert_eq!(normalize_selection((2, 5)), (2, 5));
        assert_eq!(normalize_selection((3, 3)), (3, 3));
    }

    #[test]
    fn test_non_empty_selection() {
        assert_eq!(non_empty_selection(None), None);
        assert_eq!(non_empty_selection(Some((3, 3))), None);
        assert_eq!(non_empty_selection(Some((4, 1))), Some((1, 4)));
    }

    #[test]
    fn test_trim_with_cursor() {
        let (text, cursor) = trim_with_cursor("  abc  ", 4);
        assert_eq!(text, "abc");
        assert_eq!(cursor, 2);

        let (text, cursor) = trim_with_cursor("abc, ", 5);
        assert_eq!(text, "abc,");
        assert_eq!(cursor, 4);
    }

    #[test]
    fn test_utf16_conversion() {
        let text = "a😀b";
        // 'a' = 1 unit, emoji = 2 units, 'b' = 1 unit
        assert_eq!(utf16_to_byte(text, 0), 0);
        assert_eq!(utf16_to_byte(text, 1), 1);
        assert_eq!(utf16_to_byte(text, 3), 5);
        assert_eq!(utf16_to_byte(text, 4), 6);
        assert_eq!(utf16_to_byte(text, 99), 6);

        assert_eq!(byte_to_utf16(text, 5), 3);
        assert_eq!(byte_to_utf16(text, 6), 4);
    }

    #[test]
    fn test_clamp_to_char_boundary() {
        let text = "é";
        assert_eq!(clamp_to_char_boundary(text, 1), 0);
        assert_eq!(clamp_to_char_boundary(text, 10), 2);
    }

    #[test]
    fn test_caret_offset_wraps() {
        // font 10 -> 6px chars, 60px box -> 10 chars per line
        let (x, y) = caret_offset("0123456789abc", 13, 10.0, 60.0);
        assert!((x - 18.0).abs() < 0.001);
        assert!((y - 12.0).abs() < 0.001);

        let (x, y) = caret_offset("ab\ncd", 5, 10.0, 60.0);
        assert!((x - 12.0).abs() < 0.001);
        assert!((y - 12.0).abs() < 0.001);
    }
}
