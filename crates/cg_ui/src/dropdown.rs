//! Searchable multi-field dropdown.
//!
//! A [`DropdownController`] owns N fields. Each field has its own option set,
//! a selected value and the text currently shown in its input. One shared
//! option list is opened below whichever field is active.

use std::time::Duration;

use thiserror::Error;
use web_time::Instant;

use crate::builder_field;
use crate::constants::{
    DROPDOWN_ITEM_HEIGHT, DROPDOWN_MAX_VISIBLE_ITEMS, DROPDOWN_MAX_WIDTH,
    DROPDOWN_SEARCH_DEBOUNCE_MS, DROPDOWN_VIEWPORT_FRACTION, HOVER_PREVIEW_INTERVAL_MS,
};
use crate::geometry::Rect;
use crate::throttle::{Debounce, DebounceToken, Throttle};

/// Errors raised when feeding a dropdown
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DropdownError {
    #[error("expected {expected} option sets, got {got}")]
    FieldCountMismatch { expected: usize, got: usize },

    #[error("field index {0} out of range")]
    IndexOutOfRange(usize),

    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    pub key: String,
    pub value: String,
}

impl DropdownOption {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Option whose value is its key.
    pub fn keyed(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            value: key.clone(),
            key,
        }
    }

    /// Text shown for this option in the list.
    pub fn label(&self, final_field: bool) -> String {
        if final_field || self.key == self.value {
            self.key.clone()
        } else {
            format!("{}\n({})", self.key, self.value)
        }
    }

    fn matches(&self, needle: &str, final_field: bool) -> bool {
        self.key.to_lowercase().contains(needle)
            || (!final_field && self.value.to_lowercase().contains(needle))
    }
}

/// A value to write into the text field bound to a dropdown slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWrite {
    pub index: usize,
    pub value: String,
}

/// Change notification carrying every selected value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownChange {
    pub values: Vec<String>,
}

#[derive(Debug, Clone)]
struct PendingSearch {
    token: DebounceToken,
    index: usize,
    text: String,
}

/// State of one multi-field dropdown
#[derive(Debug, Clone)]
pub struct DropdownController {
    labels: Vec<String>,
    options: Vec<Vec<DropdownOption>>,
    filtered: Vec<Vec<DropdownOption>>,
    selected: Vec<String>,
    displayed: Vec<String>,
    editing: Vec<bool>,
    active: Option<usize>,
    open: bool,
    search_enabled: bool,
    hover_preview: bool,
    hover_throttle: Throttle,
    last_hover_key: Option<String>,
    search_debounce: Debounce,
    pending_search: Option<PendingSearch>,
}

impl DropdownController {
    /// Create a dropdown with `labels.len()` fields.
    pub fn new(labels: Vec<String>) -> Self {
        let count = labels.len();
        Self {
            labels,
            options: vec![Vec::new(); count],
            filtered: vec![Vec::new(); count],
            selected: vec![String::new(); count],
            displayed: vec![String::new(); count],
            editing: vec![false; count],
            active: None,
            open: false,
            search_enabled: true,
            hover_preview: false,
            hover_throttle: Throttle::from_millis(HOVER_PREVIEW_INTERVAL_MS),
            last_hover_key: None,
            search_debounce: Debounce::from_millis(DROPDOWN_SEARCH_DEBOUNCE_MS),
            pending_search: None,
        }
    }

    builder_field!(searchable, search_enabled, bool);
    builder_field!(hover_preview, bool);

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn field_count(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_searchable(&self) -> bool {
        self.search_enabled
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_editing(&self, index: usize) -> bool {
        self.editing.get(index).copied().unwrap_or(false)
    }

    /// Text to show in the input of field `index`.
    pub fn displayed(&self, index: usize) -> Option<&str> {
        self.displayed.get(index).map(String::as_str)
    }

    /// Selected value of every field.
    pub fn value(&self) -> Vec<String> {
        self.selected.clone()
    }

    pub fn search_delay(&self) -> Duration {
        self.search_debounce.delay()
    }

    fn is_final_field(&self, index: usize) -> bool {
        index + 1 == self.field_count()
    }

    /// `(key, label)` pairs of the open list.
    pub fn visible_items(&self) -> Vec<(String, String)> {
        let Some(index) = self.active else {
            return Vec::new();
        };
        let final_field = self.is_final_field(index);
        self.filtered[index]
            .iter()
            .map(|o| (o.key.clone(), o.label(final_field)))
            .collect()
    }

    // =========================================================================
    // External updates
    // =========================================================================

    /// Replace all option sets, optionally relabel the fields, and reset each
    /// field to its default. Returns the writes for the bound text fields.
    pub fn set_options(
        &mut self,
        option_sets: Vec<Vec<DropdownOption>>,
        labels: Option<Vec<String>>,
        defaults: &[String],
        enable_search: Option<bool>,
    ) -> Result<Vec<FieldWrite>, DropdownError> {
        let count = self.field_count();
        if option_sets.len() != count {
            return Err(DropdownError::FieldCountMismatch {
                expected: count,
                got: option_sets.len(),
            });
        }

        self.filtered = option_sets.clone();
        self.options = option_sets;

        match labels {
            Some(labels) if labels.len() == count => self.labels = labels,
            Some(labels) => {
                log::warn!(
                    "[dropdown] ignoring {} labels for {} fields",
                    labels.len(),
                    count
                );
            }
            None => {}
        }
        if let Some(enabled) = enable_search {
            self.search_enabled = enabled;
        }

        let writes = (0..count)
            .map(|index| {
                let value = defaults.get(index).cloned().unwrap_or_default();
                self.selected[index] = value.clone();
                self.displayed[index] = value.clone();
                FieldWrite { index, value }
            })
            .collect();
        Ok(writes)
    }

    /// Reset every field that is not being edited to its default.
    pub fn update_defaults(&mut self, defaults: &[String]) -> Vec<FieldWrite> {
        let mut writes = Vec::new();
        for index in 0..self.field_count() {
            if self.editing[index] {
                continue;
            }
            let value = defaults.get(index).cloned().unwrap_or_default();
            self.selected[index] = value.clone();
            self.displayed[index] = value.clone();
            writes.push(FieldWrite { index, value });
        }
        writes
    }

    // =========================================================================
    // Pointer & keyboard
    // =========================================================================

    /// Field `index` was clicked.
    pub fn click_field(&mut self, index: usize) -> Result<(), DropdownError> {
        if index >= self.field_count() {
            return Err(DropdownError::IndexOutOfRange(index));
        }

        if self.search_enabled {
            if self.editing[index] {
                return Ok(());
            }
            if self.open {
                // Second click on an open list starts a search
                self.active = Some(index);
                self.editing[index] = true;
                self.displayed[index].clear();
                self.filtered[index] = self.options[index].clone();
                return Ok(());
            }
            self.open_field(index);
        } else {
            if self.open && self.active == Some(index) {
                self.open = false;
                self.active = None;
            } else {
                if let Some(prev) = self.active {
                    self.displayed[prev] = self.selected[prev].clone();
                }
                self.open_field(index);
            }
            self.displayed[index] = self.selected[index].clone();
        }
        Ok(())
    }

    fn open_field(&mut self, index: usize) {
        self.active = Some(index);
        self.filtered[index] = self.options[index].clone();
        self.open = !self.filtered[index].is_empty();
    }

    /// Search text typed into field `index`. Returns the token to hand back to
    /// [`Self::on_search_timer`] once the debounce delay has passed.
    pub fn on_search_input(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<DebounceToken, DropdownError> {
        if index >= self.field_count() {
            return Err(DropdownError::IndexOutOfRange(index));
        }
        let text = text.into();
        self.displayed[index] = text.clone();
        let token = self.search_debounce.trigger();
        self.pending_search = Some(PendingSearch { token, index, text });
        Ok(token)
    }

    /// Debounce timer fired. Returns true if the list was refiltered.
    pub fn on_search_timer(&mut self, token: DebounceToken) -> bool {
        if !self.search_debounce.fire(token) {
            return false;
        }
        let Some(pending) = self.pending_search.take_if(|pending| pending.token == token) else {
            return false;
        };
        self.filter(pending.index, &pending.text);
        true
    }

    /// Filter field `index` by `text` (case-insensitive).
    pub fn filter(&mut self, index: usize, text: &str) {
        if index >= self.field_count() {
            return;
        }
        let needle = text.to_lowercase();
        let final_field = self.is_final_field(index);
        self.filtered[index] = self.options[index]
            .iter()
            .filter(|o| o.matches(&needle, final_field))
            .cloned()
            .collect();
        self.active = Some(index);
        self.open = !self.filtered[index].is_empty();
    }

    /// An option in the open list was clicked.
    pub fn select(&mut self, key: &str) -> Option<(FieldWrite, DropdownChange)> {
        let index = self.active?;
        self.selected[index] = key.to_string();
        self.displayed[index] = key.to_string();
        self.editing[index] = false;
        self.open = false;
        self.search_debounce.cancel();
        self.pending_search = None;

        log::debug!("[dropdown] field {} -> {}", index, key);
        Some((
            FieldWrite {
                index,
                value: key.to_string(),
            },
            DropdownChange {
                values: self.selected.clone(),
            },
        ))
    }

    /// A click landed outside the fields and the list.
    pub fn click_outside(&mut self) {
        self.open = false;
        self.active = None;
        self.displayed.clone_from(&self.selected);
        self.editing.iter_mut().for_each(|e| *e = false);
        self.search_debounce.cancel();
        self.pending_search = None;
    }

    /// Pointer entered the list item for `key`. Returns the key to push into
    /// the preview surface, if any.
    pub fn hover(&mut self, key: &str, now: Instant) -> Option<String> {
        if !self.hover_preview || !self.open {
            return None;
        }
        if !self.hover_throttle.allow(now) {
            return None;
        }
        if self.last_hover_key.as_deref() == Some(key) {
            return None;
        }
        self.last_hover_key = Some(key.to_string());
        Some(key.to_string())
    }

    /// Pointer left a list item. Returns true if the preview should hide.
    pub fn hover_leave(&mut self) -> bool {
        if !self.hover_preview {
            return false;
        }
        self.last_hover_key = None;
        true
    }

    /// Placement of the option list below the input at `input`.
    pub fn list_rect(input: Rect, viewport_height: f32) -> Rect {
        let max_height = (DROPDOWN_MAX_VISIBLE_ITEMS as f32 * DROPDOWN_ITEM_HEIGHT)
            .min(viewport_height * DROPDOWN_VIEWPORT_FRACTION);
        Rect::new(
            input.x,
            input.bottom(),
            input.width.min(DROPDOWN_MAX_WIDTH),
            max_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        ["a", "b", "c", "final"].iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> DropdownController {
        let mut dd = DropdownController::new(labels()).hover_preview(true);
        let shared = vec![
            DropdownOption::new("Alice", "alice_(series)"),
            DropdownOption::new("Bob", "Bob"),
        ];
        let finals = vec![DropdownOption::keyed("none"), DropdownOption::keyed("Alpha")];
        dd.set_options(
            vec![shared.clone(), shared.clone(), shared, finals],
            None,
            &["Alice".to_string()],
            None,
        )
        .unwrap();
        dd
    }

    #[test]
    fn test_set_options_writes_defaults() {
        let mut dd = DropdownController::new(labels());
        let writes = dd
            .set_options(vec![vec![]; 4], None, &["x".to_string(), "y".to_string()], Some(false))
            .unwrap();
        assert_eq!(writes.len(), 4);
        assert_eq!(writes[1], FieldWrite { index: 1, value: "y".into() });
        assert_eq!(writes[3].value, "");
        assert_eq!(dd.value(), vec!["x", "y", "", ""]);
        assert!(!dd.is_searchable());
    }

    #[test]
    fn test_set_options_count_mismatch() {
        let mut dd = DropdownController::new(labels());
        let err = dd.set_options(vec![vec![]; 3], None, &[], None).unwrap_err();
        assert_eq!(err, DropdownError::FieldCountMismatch { expected: 4, got: 3 });
    }

    #[test]
    fn test_labels() {
        let opt = DropdownOption::new("Alice", "alice_(series)");
        assert_eq!(opt.label(false), "Alice\n(alice_(series))");
        assert_eq!(opt.label(true), "Alice");
        assert_eq!(DropdownOption::keyed("x").label(false), "x");
    }

    #[test]
    fn test_filter_by_key_and_value() {
        let mut dd = sample();
        dd.filter(0, "SERIES");
        assert_eq!(dd.visible_items().len(), 1);

        // Final field matches keys only
        let mut dd = sample();
        dd.set_options(
            vec![vec![], vec![], vec![], vec![DropdownOption::new("k", "series")]],
            None,
            &[],
            None,
        )
        .unwrap();
        dd.filter(3, "series");
        assert!(dd.visible_items().is_empty());
        assert!(!dd.is_open());
    }

    #[test]
    fn test_search_debounce_uses_latest() {
        let mut dd = sample();
        let first = dd.on_search_input(1, "al").unwrap();
        let second = dd.on_search_input(1, "bo").unwrap();
        assert!(!dd.on_search_timer(first));
        assert!(dd.on_search_timer(second));
        assert_eq!(dd.visible_items()[0].0, "Bob");
    }

    #[test]
    fn test_search_timer_fires_once() {
        let mut dd = sample();
        dd.click_field(1).unwrap();
        let token = dd.on_search_input(1, "bo").unwrap();
        assert!(dd.on_search_timer(token));
        assert!(!dd.on_search_timer(token));

        // Selecting drops the pending search
        let token = dd.on_search_input(1, "al").unwrap();
        dd.select("Bob");
        assert!(!dd.on_search_timer(token));
    }

    #[test]
    fn test_select_fires_change() {
        let mut dd = sample();
        dd.click_field(2).unwrap();
        assert!(dd.is_open());
        let (write, change) = dd.select("Bob").unwrap();
        assert_eq!(write, FieldWrite { index: 2, value: "Bob".into() });
        assert_eq!(change.values, vec!["Alice", "", "Bob", ""]);
        assert!(!dd.is_open());
    }

    #[test]
    fn test_second_click_enters_editing() {
        let mut dd = sample();
        dd.click_field(0).unwrap();
        dd.click_field(0).unwrap();
        assert!(dd.is_editing(0));
        assert_eq!(dd.displayed(0), Some(""));

        dd.click_outside();
        assert!(!dd.is_editing(0));
        assert_eq!(dd.displayed(0), Some("Alice"));
        assert_eq!(dd.active(), None);
    }

    #[test]
    fn test_update_defaults_skips_editing() {
        let mut dd = sample();
        dd.click_field(1).unwrap();
        dd.click_field(1).unwrap();
        let writes = dd.update_defaults(&["p".into(), "q".into(), "r".into(), "s".into()]);
        assert_eq!(writes.len(), 3);
        assert_eq!(dd.value(), vec!["p", "", "r", "s"]);
    }

    #[test]
    fn test_read_only_toggle() {
        let mut dd = sample().searchable(false);
        dd.click_field(0).unwrap();
        assert!(dd.is_open());
        dd.click_field(0).unwrap();
        assert!(!dd.is_open());
        assert_eq!(dd.active(), None);
    }

    #[test]
    fn test_hover_throttle_and_dedup() {
        let mut dd = sample();
        dd.click_field(0).unwrap();
        let t0 = Instant::now();
        assert_eq!(dd.hover("Alice", t0), Some("Alice".into()));
        assert_eq!(dd.hover("Bob", t0 + Duration::from_millis(5)), None);
        assert_eq!(dd.hover("Alice", t0 + Duration::from_millis(40)), None);
        assert_eq!(dd.hover("Bob", t0 + Duration::from_millis(80)), Some("Bob".into()));
        assert!(dd.hover_leave());
        assert_eq!(dd.hover("Bob", t0 + Duration::from_millis(120)), Some("Bob".into()));
    }

    #[test]
    fn test_list_rect() {
        let rect = DropdownController::list_rect(Rect::new(10.0, 20.0, 800.0, 30.0), 1000.0);
        assert_eq!(rect, Rect::new(10.0, 50.0, 600.0, 800.0));
    }
}
