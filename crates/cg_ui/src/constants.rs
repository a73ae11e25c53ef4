//! Centralized constants for cg_ui
//!
//! All magic numbers shared between widgets live here.

// =============================================================================
// Typography
// =============================================================================

/// Approximate character width as a ratio of font size.
/// Used to estimate caret position without a layout engine.
pub const CHAR_WIDTH_FACTOR: f32 = 0.6;

/// Font size assumed for text inputs when the caller has none.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;

/// Line height as a ratio of font size
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

// =============================================================================
// Tag Weights
// =============================================================================

/// Amount added or removed by one Ctrl+Arrow press
pub const WEIGHT_STEP: f64 = 0.05;

/// Lowest weight a tag may carry
pub const WEIGHT_MIN: f64 = 0.0;

/// Highest weight a tag may carry
pub const WEIGHT_MAX: f64 = 3.0;

/// Weight of a tag written without parentheses
pub const DEFAULT_WEIGHT: f64 = 1.0;

// =============================================================================
// Suggestion Box
// =============================================================================

/// Quiet period after the last keystroke before a lookup is issued
pub const SUGGESTION_DEBOUNCE_MS: u64 = 50;

/// Upper bound for the suggestion box width
pub const SUGGESTION_BOX_MAX_WIDTH: f32 = 300.0;

/// Extra width added to the widest candidate
pub const SUGGESTION_BOX_EXTRA_WIDTH: f32 = 20.0;

/// Fallback box size used before the box has been measured
pub const SUGGESTION_BOX_FALLBACK_WIDTH: f32 = 200.0;
pub const SUGGESTION_BOX_FALLBACK_HEIGHT: f32 = 100.0;

/// Distance kept from the right viewport edge
pub const SUGGESTION_BOX_PADDING_X: f32 = 24.0;

/// Distance kept from the bottom viewport edge
pub const SUGGESTION_BOX_PADDING_Y: f32 = 12.0;

// =============================================================================
// Dropdown
// =============================================================================

/// Minimum interval between hover preview pushes (~30 per second)
pub const HOVER_PREVIEW_INTERVAL_MS: u64 = 32;

/// Quiet period before the search text filters the option list
pub const DROPDOWN_SEARCH_DEBOUNCE_MS: u64 = 100;

/// Width cap for the option list
pub const DROPDOWN_MAX_WIDTH: f32 = 600.0;

/// Nominal height of one option row
pub const DROPDOWN_ITEM_HEIGHT: f32 = 40.0;

/// Number of rows shown before the list scrolls
pub const DROPDOWN_MAX_VISIBLE_ITEMS: usize = 30;

/// Fraction of the viewport height the list may cover
pub const DROPDOWN_VIEWPORT_FRACTION: f32 = 0.8;

// =============================================================================
// Overlays & Dragging
// =============================================================================

/// Pointer travel that turns a press into a drag instead of a click
pub const CLICK_MOVE_THRESHOLD: f32 = 5.0;

/// Minimum size of a resizable overlay
pub const OVERLAY_MIN_WIDTH: f32 = 200.0;
pub const OVERLAY_MIN_HEIGHT: f32 = 150.0;

/// Largest persisted overlay size that is still trusted on load
pub const OVERLAY_MAX_SIZE: f32 = 1600.0;

/// Gap kept between a resized overlay and the viewport edge
pub const OVERLAY_FIT_PADDING: f32 = 10.0;

/// Offset of the resize grip from the overlay corner
pub const RESIZE_HANDLE_OFFSET: f32 = 4.0;

// =============================================================================
// Fullscreen Viewer
// =============================================================================

/// Zoom limits of the fullscreen viewer
pub const FULLSCREEN_ZOOM_MIN: f32 = 0.5;
pub const FULLSCREEN_ZOOM_MAX: f32 = 4.0;

/// Scale change per wheel delta unit
pub const WHEEL_ZOOM_SENSITIVITY: f32 = 0.001;

// =============================================================================
// Helper Functions
// =============================================================================

/// Calculate approximate character width for the given font size
#[inline]
pub fn char_width(font_size: f32) -> f32 {
    font_size * CHAR_WIDTH_FACTOR
}

/// Calculate line height for the given font size
#[inline]
pub fn line_height(font_size: f32) -> f32 {
    font_size * LINE_HEIGHT_FACTOR
}

/// Round to two decimals, the precision tag weights are stored with.
#[inline]
pub fn round_weight(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a weight with at most two decimals and no trailing zeros.
///
/// `1.05` stays `1.05`, `1.10` becomes `1.1` and `2.00` becomes `2`.
pub fn format_weight(value: f64) -> String {
    let formatted = format!("{:.2}", round_weight(value));
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_width() {
        assert!((char_width(14.0) - 8.4).abs() < 0.001);
        assert!((char_width(10.0) - 6.0).abs() < 0.001);
    }

    #[test]
    fn test_line_height() {
        assert!((line_height(14.0) - 16.8).abs() < 0.001);
    }

    #[test]
    fn test_round_weight() {
        assert_eq!(round_weight(1.05 - 0.05), 1.0);
        assert_eq!(round_weight(2.95 + 0.05), 3.0);
        assert_eq!(round_weight(0.123), 0.12);
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(1.05), "1.05");
        assert_eq!(format_weight(1.1), "1.1");
        assert_eq!(format_weight(2.0), "2");
        assert_eq!(format_weight(0.0), "0");
        assert_eq!(format_weight(0.95), "0.95");
    }

    #[test]
    fn test_constants_are_sane() {
        assert!(WEIGHT_MAX > WEIGHT_MIN);
        assert!(WEIGHT_STEP > 0.0);
        assert!(FULLSCREEN_ZOOM_MAX > FULLSCREEN_ZOOM_MIN);
        assert!(OVERLAY_MAX_SIZE > OVERLAY_MIN_WIDTH);
        assert!(SUGGESTION_BOX_MAX_WIDTH > SUGGESTION_BOX_EXTRA_WIDTH);
    }
}
