//! Word boundaries around the caret.

/// What ends the word under the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// A newline sits right at the caret
    ImmediateNewline,
    /// The nearest separator after the caret is a comma
    Comma,
    /// The nearest separator after the caret is a newline
    Newline,
    /// No separator follows
    EndOfText,
}

/// Untrimmed span of the word under the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan {
    pub start: usize,
    pub end: usize,
    pub terminator: Terminator,
}

impl WordSpan {
    pub fn as_str<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    /// Whether the word begins a line (nothing but a newline, or the start of
    /// the text, before it).
    pub fn starts_line(&self, text: &str) -> bool {
        self.start == 0 || text.as_bytes().get(self.start - 1) == Some(&b'\n')
    }
}

fn is_separator(c: char) -> bool {
    c == ',' || c == '\n'
}

/// Span between the nearest comma/newline before `cursor` and the nearest
/// one after it. A newline directly at the caret ends the word at the caret.
pub fn word_span(text: &str, cursor: usize) -> WordSpan {
    let cursor = crate::text_core::clamp_to_char_boundary(text, cursor);
    let (before, after) = text.split_at(cursor);

    let start = before.rfind(is_separator).map(|i| i + 1).unwrap_or(0);

    let (end, terminator) = if after.starts_with('\n') {
        (cursor, Terminator::ImmediateNewline)
    } else {
        match after.find(is_separator) {
            Some(i) if after[i..].starts_with(',') => (cursor + i, Terminator::Comma),
            Some(i) => (cursor + i, Terminator::Newline),
            None => (text.len(), Terminator::EndOfText),
        }
    };

    WordSpan {
        start,
        end,
        terminator,
    }
}

/// The trimmed word to look up, or `None` when lookup should be suppressed.
pub fn extract_word(text: &str, cursor: usize) -> Option<&str> {
    let word = word_span(text, cursor).as_str(text).trim();
    if word.is_empty() || word.ends_with(',') {
        None
    } else {
        Some(word)
    }
}
