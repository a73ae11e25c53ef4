//! Per-input autocomplete state machine.

use super::suggestion::{SuggestionItem, apply_suggestion, box_width};
use super::weight::adjust_weight;
use super::word::extract_word;
use super::TextEdit;
use crate::builder_field;
use crate::constants::{
    DEFAULT_FONT_SIZE, SUGGESTION_BOX_FALLBACK_HEIGHT, SUGGESTION_BOX_FALLBACK_WIDTH,
    SUGGESTION_BOX_PADDING_X, SUGGESTION_BOX_PADDING_Y, SUGGESTION_DEBOUNCE_MS,
};
use crate::event::{Key, Modifiers};
use crate::geometry::{Point, Rect, Size};
use crate::throttle::{Debounce, DebounceToken};

/// A lookup the caller should run against the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    /// Echo this back through [`TagEditor::on_suggestions`]
    pub generation: u64,
    pub word: String,
}

/// What to do after the debounced input handler ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// A newer keystroke superseded this one
    Stale,
    /// The input echoes a value this editor just wrote; nothing to do
    Suppressed,
    /// No word to look up; hide the box
    Hide,
    Fetch(SuggestionRequest),
}

/// What a key press did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Let the browser handle it
    Ignored,
    /// Consumed; re-render the box
    Handled,
    /// Consumed; write this value into the input
    Edit(TextEdit),
}

/// Autocomplete state for one prompt input
#[derive(Debug, Clone)]
pub struct TagEditor {
    last_word_sent: String,
    /// Value last written by this editor. The input event it raises is
    /// swallowed once; any other value clears it.
    echo: Option<String>,
    generation: u64,
    items: Vec<SuggestionItem>,
    selected: Option<usize>,
    visible: bool,
    debounce: Debounce,
    font_size: f32,
}

impl Default for TagEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl TagEditor {
    pub fn new() -> Self {
        Self::with_debounce(SUGGESTION_DEBOUNCE_MS)
    }

    pub fn with_debounce(debounce_ms: u64) -> Self {
        Self {
            last_word_sent: String::new(),
            echo: None,
            generation: 0,
            items: Vec::new(),
            selected: None,
            visible: false,
            debounce: Debounce::from_millis(debounce_ms),
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    builder_field!(font_size, f32);

    pub fn items(&self) -> &[SuggestionItem] {
        &self.items
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn debounce_delay(&self) -> std::time::Duration {
        self.debounce.delay()
    }

    /// Width the box should be rendered with.
    pub fn box_width(&self) -> f32 {
        box_width(&self.items, self.font_size)
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// The input's value changed. Schedule [`Self::on_input`] after the
    /// debounce delay with the returned token.
    pub fn input_changed(&mut self) -> DebounceToken {
        self.debounce.trigger()
    }

    /// Debounced input handler.
    pub fn on_input(&mut self, token: DebounceToken, text: &str, cursor: usize) -> InputOutcome {
        if !self.debounce.fire(token) {
            return InputOutcome::Stale;
        }
        if self.echo.take().is_some_and(|echo| echo == text) {
            return InputOutcome::Suppressed;
        }

        let word = match extract_word(text, cursor) {
            Some(word) if word != self.last_word_sent => word.to_string(),
            _ => {
                self.hide();
                return InputOutcome::Hide;
            }
        };

        self.last_word_sent.clone_from(&word);
        self.generation += 1;
        log::debug!("[suggest] lookup #{} for '{}'", self.generation, word);
        InputOutcome::Fetch(SuggestionRequest {
            generation: self.generation,
            word,
        })
    }

    /// Candidates arrived for `generation`. Returns true if the box should
    /// now be shown.
    pub fn on_suggestions(&mut self, generation: u64, items: Vec<SuggestionItem>) -> bool {
        if generation != self.generation {
            log::debug!(
                "[suggest] dropping stale response #{} (latest #{})",
                generation,
                self.generation
            );
            return false;
        }
        if items.is_empty() {
            self.hide();
            return false;
        }
        self.items = items;
        self.selected = None;
        self.visible = true;
        true
    }

    /// The lookup for `generation` failed.
    pub fn on_fetch_failed(&mut self, generation: u64) {
        if generation == self.generation {
            self.hide();
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.selected = None;
        self.items.clear();
    }

    // =========================================================================
    // Keyboard & pointer
    // =========================================================================

    /// Key pressed in the input. `selection` is the input's selection range,
    /// equal ends when it is just a caret.
    pub fn on_key(
        &mut self,
        key: Key,
        modifiers: Modifiers,
        text: &str,
        selection: (usize, usize),
    ) -> KeyOutcome {
        if modifiers.ctrl && key.is_vertical_arrow() {
            return match adjust_weight(text, selection, key == Key::Up) {
                Some(edit) => {
                    self.echo = Some(edit.text.clone());
                    KeyOutcome::Edit(edit)
                }
                None => KeyOutcome::Handled,
            };
        }

        if !self.visible || self.items.is_empty() {
            return KeyOutcome::Ignored;
        }

        let last = self.items.len() - 1;
        match key {
            Key::Tab | Key::Enter => {
                let index = self.selected.unwrap_or(0);
                match self.accept(index, text, selection.0) {
                    Some(edit) => KeyOutcome::Edit(edit),
                    None => KeyOutcome::Handled,
                }
            }
            Key::Down => {
                self.selected = Some(self.selected.map_or(0, |i| (i + 1).min(last)));
                KeyOutcome::Handled
            }
            Key::Up => {
                self.selected = Some(self.selected.map_or(0, |i| i.saturating_sub(1)));
                KeyOutcome::Handled
            }
            Key::Escape => {
                self.hide();
                KeyOutcome::Handled
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// Write candidate `index` into `text` at `cursor`.
    pub fn accept(&mut self, index: usize, text: &str, cursor: usize) -> Option<TextEdit> {
        let item = self.items.get(index)?;
        let applied = apply_suggestion(text, cursor, &item.markup);
        log::debug!("[suggest] applied '{}'", applied.inserted);

        self.hide();
        self.echo = Some(applied.text.clone());
        Some(TextEdit {
            text: applied.text,
            cursor: applied.cursor,
        })
    }

    /// A click landed somewhere. Hides the box unless it hit the box or the
    /// input itself.
    pub fn click_elsewhere(&mut self, inside_box_or_input: bool) {
        if !inside_box_or_input {
            self.hide();
        }
    }
}

/// Page position of the suggestion box.
///
/// `input` is the input's page rect, `caret_x` the caret offset within it,
/// `size` the box size (zero falls back to a nominal size) and `scroll` the
/// page scroll offset. The box sits below the input at the caret, shifts left
/// to stay inside the viewport and flips above the input when it would run
/// off the bottom.
pub fn place_suggestion_box(
    input: Rect,
    caret_x: f32,
    size: Size,
    viewport: Size,
    scroll: Point,
) -> Point {
    let width = if size.width > 0.0 {
        size.width
    } else {
        SUGGESTION_BOX_FALLBACK_WIDTH
    };
    let height = if size.height > 0.0 {
        size.height
    } else {
        SUGGESTION_BOX_FALLBACK_HEIGHT
    };

    let mut left = input.x + caret_x;
    if left + width > viewport.width - SUGGESTION_BOX_PADDING_X {
        left = (viewport.width - width - SUGGESTION_BOX_PADDING_X).max(0.0);
    }
    if left < input.x {
        left = input.x;
    }

    let mut top = input.bottom();
    if top + height > viewport.height + scroll.y - SUGGESTION_BOX_PADDING_Y {
        top = input.y - height - SUGGESTION_BOX_PADDING_Y;
        if top < scroll.y {
            top = input.bottom();
        }
    }

    Point::new(left, top)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<SuggestionItem> {
        (0..n)
            .map(|i| SuggestionItem::from_markup(format!("<b>tag{}</b> ({})", i, i * 10)))
            .collect()
    }

    fn fetch(editor: &mut TagEditor, text: &str) -> InputOutcome {
        let token = editor.input_changed();
        editor.on_input(token, text, text.len())
    }

    #[test]
    fn test_input_requests_lookup() {
        let mut editor = TagEditor::new();
        match fetch(&mut editor, "a, blu") {
            InputOutcome::Fetch(req) => {
                assert_eq!(req.word, "blu");
                assert_eq!(req.generation, 1);
            }
            other => panic!("expected fetch, got {:?}", other),
        }
        // Same word again
        assert_eq!(fetch(&mut editor, "a, blu"), InputOutcome::Hide);
        // Empty word
        assert_eq!(fetch(&mut editor, "a, "), InputOutcome::Hide);
    }

    #[test]
    fn test_debounce_drops_superseded_input() {
        let mut editor = TagEditor::new();
        let first = editor.input_changed();
        let second = editor.input_changed();
        assert_eq!(editor.on_input(first, "ab", 2), InputOutcome::Stale);
        assert!(matches!(editor.on_input(second, "ab", 2), InputOutcome::Fetch(_)));
    }

    #[test]
    fn test_stale_generation_dropped() {
        let mut editor = TagEditor::new();
        fetch(&mut editor, "bl");
        fetch(&mut editor, "blu");
        assert!(!editor.on_suggestions(1, items(3)));
        assert!(!editor.is_visible());
        assert!(editor.on_suggestions(2, items(3)));
        assert!(editor.is_visible());
    }

    #[test]
    fn test_apply_then_input_does_not_refetch() {
        let mut editor = TagEditor::new();
        fetch(&mut editor, "1gi");
        editor.on_suggestions(1, items(2));

        let outcome = editor.on_key(Key::Tab, Modifiers::NONE, "1gi", (3, 3));
        let KeyOutcome::Edit(edit) = outcome else {
            panic!("expected edit");
        };
        assert_eq!(edit.text, "tag0,");
        assert!(!editor.is_visible());

        // The synthetic input event from the edit is swallowed
        assert_eq!(fetch(&mut editor, &edit.text), InputOutcome::Suppressed);
        assert_eq!(editor.generation(), 1);
    }

    #[test]
    fn test_missed_echo_does_not_swallow_typing() {
        let mut editor = TagEditor::new();
        fetch(&mut editor, "1gi");
        editor.on_suggestions(1, items(1));
        let KeyOutcome::Edit(edit) = editor.on_key(Key::Enter, Modifiers::NONE, "1gi", (3, 3)) else {
            panic!("expected edit");
        };

        // The echo of the edit never arrives; the next keystroke still looks up
        let typed = format!("{} re", edit.text);
        match fetch(&mut editor, &typed) {
            InputOutcome::Fetch(req) => assert_eq!(req.word, "re"),
            other => panic!("expected fetch, got {:?}", other),
        }
        assert_eq!(editor.generation(), 2);
    }

    #[test]
    fn test_weight_edit_echo_swallowed_once() {
        let mut editor = TagEditor::new();
        let KeyOutcome::Edit(edit) = editor.on_key(Key::Up, Modifiers::CTRL, "cat", (1, 1)) else {
            panic!("expected edit");
        };
        assert_eq!(fetch(&mut editor, &edit.text), InputOutcome::Suppressed);
        assert!(matches!(fetch(&mut editor, "(cat:1.05), d"), InputOutcome::Fetch(_)));
    }

    #[test]
    fn test_arrow_navigation_clamps() {
        let mut editor = TagEditor::new();
        fetch(&mut editor, "t");
        editor.on_suggestions(1, items(3));

        editor.on_key(Key::Up, Modifiers::NONE, "t", (1, 1));
        assert_eq!(editor.selected(), Some(0));
        for _ in 0..5 {
            editor.on_key(Key::Down, Modifiers::NONE, "t", (1, 1));
        }
        assert_eq!(editor.selected(), Some(2));

        let KeyOutcome::Edit(edit) = editor.on_key(Key::Enter, Modifiers::NONE, "t", (1, 1)) else {
            panic!("expected edit");
        };
        assert_eq!(edit.text, "tag2,");
    }

    #[test]
    fn test_escape_hides() {
        let mut editor = TagEditor::new();
        fetch(&mut editor, "t");
        editor.on_suggestions(1, items(1));
        assert_eq!(editor.on_key(Key::Escape, Modifiers::NONE, "t", (1, 1)), KeyOutcome::Handled);
        assert!(!editor.is_visible());
        assert_eq!(editor.on_key(Key::Tab, Modifiers::NONE, "t", (1, 1)), KeyOutcome::Ignored);
    }

    #[test]
    fn test_ctrl_arrow_adjusts_weight_even_with_box() {
        let mut editor = TagEditor::new();
        fetch(&mut editor, "cat");
        editor.on_suggestions(1, items(2));

        let outcome = editor.on_key(Key::Up, Modifiers::CTRL, "cat", (1, 1));
        assert_eq!(
            outcome,
            KeyOutcome::Edit(TextEdit {
                text: "(cat:1.05)".into(),
                cursor: 10
            })
        );
        // Selection untouched
        assert_eq!(editor.selected(), None);

        assert_eq!(
            editor.on_key(Key::Down, Modifiers::CTRL, "", (0, 0)),
            KeyOutcome::Handled
        );
    }

    #[test]
    fn test_click_elsewhere() {
        let mut editor = TagEditor::new();
        fetch(&mut editor, "t");
        editor.on_suggestions(1, items(1));
        editor.click_elsewhere(true);
        assert!(editor.is_visible());
        editor.click_elsewhere(false);
        assert!(!editor.is_visible());
    }

    #[test]
    fn test_place_suggestion_box() {
        let viewport = Size::new(1000.0, 800.0);
        let input = Rect::new(100.0, 100.0, 400.0, 50.0);

        let pos = place_suggestion_box(input, 40.0, Size::new(200.0, 100.0), viewport, Point::ORIGIN);
        assert_eq!(pos, Point::new(140.0, 150.0));

        // Clamped from the right edge
        let pos = place_suggestion_box(input, 750.0, Size::new(200.0, 100.0), viewport, Point::ORIGIN);
        assert_eq!(pos.x, 776.0);

        // Flipped above when it would overflow the bottom
        let low = Rect::new(100.0, 700.0, 400.0, 50.0);
        let pos = place_suggestion_box(low, 0.0, Size::new(200.0, 100.0), viewport, Point::ORIGIN);
        assert_eq!(pos.y, 588.0);
    }
}
