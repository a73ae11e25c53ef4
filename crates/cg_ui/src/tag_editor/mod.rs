//! Prompt tag editing: cursor-relative word extraction, autocomplete and
//! `(tag:weight)` adjustment.
//!
//! Prompts are comma or newline separated lists of tags. All offsets are byte
//! offsets into the prompt string.

mod editor;
mod suggestion;
mod weight;
mod word;

pub use editor::{InputOutcome, KeyOutcome, SuggestionRequest, TagEditor, place_suggestion_box};
pub use suggestion::{
    AppliedSuggestion, SuggestionItem, apply_suggestion, box_width, canonical_text,
    format_suggestion,
};
pub use weight::{adjust_weight, parse_weighted};
pub use word::{Terminator, WordSpan, extract_word, word_span};

/// A replacement value and caret position for a text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub text: String,
    pub cursor: usize,
}
