//! Split and grid presentation of the gallery.
//!
//! The view never renders anything itself. It tracks which images the
//! surface already shows and hands out [`CellBatch`]es describing what to add
//! or redraw.

use crate::constants::{GRID_ASPECT_EPSILON, GRID_CELL_GAP};

use super::store::GalleryStore;

/// Gallery presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GalleryMode {
    /// One focused image above a filmstrip
    #[default]
    Split,
    /// Fixed-size cells, newest first
    Grid,
}

impl GalleryMode {
    pub fn toggled(self) -> Self {
        match self {
            GalleryMode::Split => GalleryMode::Grid,
            GalleryMode::Grid => GalleryMode::Split,
        }
    }
}

/// Cell geometry of grid mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub cell_width: f32,
    pub cell_height: f32,
    pub columns: usize,
}

impl GridLayout {
    pub fn compute(aspect_ratio: f32, container_width: f32, cell_height: f32) -> Self {
        let cell_width = cell_height * aspect_ratio;
        let columns = (container_width / (cell_width + GRID_CELL_GAP)).floor();
        Self {
            cell_width,
            cell_height,
            columns: (columns.max(1.0)) as usize,
        }
    }

    /// CSS `grid-template-columns` value.
    pub fn template_columns(&self) -> String {
        format!("repeat({}, {}px)", self.columns, self.cell_width)
    }
}

/// One rendered image slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryCell {
    /// Index into the store
    pub index: usize,
    pub data_uri: String,
}

/// Cells to put on screen, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellBatch {
    /// Drop every existing cell before inserting these
    pub replace: bool,
    pub cells: Vec<GalleryCell>,
}

impl CellBatch {
    fn newest_first(store: &GalleryStore, from: usize, replace: bool) -> Self {
        let cells = store.images()[from..]
            .iter()
            .enumerate()
            .rev()
            .map(|(offset, image)| GalleryCell {
                index: from + offset,
                data_uri: image.data_uri.clone(),
            })
            .collect();
        Self { replace, cells }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && !self.replace
    }
}

/// Presentation state of the main gallery.
#[derive(Debug, Clone, Default)]
pub struct GalleryView {
    mode: GalleryMode,
    focus: Option<usize>,
    /// Number of store images already on screen
    rendered: usize,
    last_aspect: Option<f32>,
}

impl GalleryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> GalleryMode {
        self.mode
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    pub fn last_aspect(&self) -> Option<f32> {
        self.last_aspect
    }

    /// Restore an aspect ratio remembered from an earlier page load.
    pub fn set_last_aspect(&mut self, aspect: Option<f32>) {
        self.last_aspect = aspect;
    }

    /// Focus image `index`, e.g. when leaving fullscreen.
    pub fn set_focus(&mut self, index: usize, store: &GalleryStore) {
        if index < store.len() {
            self.focus = Some(index);
        }
    }

    /// Forget what is on screen; the next batch redraws everything.
    pub fn reset(&mut self) {
        self.focus = None;
        self.rendered = 0;
    }

    /// Text of the mode-switch button.
    pub fn mode_label(len: usize) -> String {
        if len == 0 {
            "<>".to_string()
        } else {
            format!("<{}>", len)
        }
    }

    /// Switch between split and grid. Everything is redrawn with the newest
    /// image focused.
    pub fn toggle_mode(&mut self, store: &GalleryStore) -> GalleryMode {
        self.mode = self.mode.toggled();
        self.rendered = 0;
        self.focus = store.newest_index();
        log::debug!("[gallery] mode -> {:?}", self.mode);
        self.mode
    }

    /// Filmstrip cells for the current store contents.
    ///
    /// With `incremental` only images appended since the last batch are
    /// returned and focus stays put. A full redraw focuses the newest image.
    pub fn split_batch(&mut self, store: &GalleryStore, incremental: bool) -> CellBatch {
        let batch = if incremental && self.rendered <= store.len() && self.rendered > 0 {
            CellBatch::newest_first(store, self.rendered, false)
        } else {
            self.focus = store.newest_index();
            CellBatch::newest_first(store, 0, true)
        };
        if self.focus.is_none() {
            self.focus = store.newest_index();
        }
        self.rendered = store.len();
        batch
    }

    /// Grid cells for the current store contents.
    ///
    /// An incremental batch adds only new images unless the aspect ratio of
    /// the measured image moved by more than [`GRID_ASPECT_EPSILON`].
    pub fn grid_batch(&mut self, store: &GalleryStore, aspect: f32, incremental: bool) -> CellBatch {
        let aspect_changed = self
            .last_aspect
            .is_none_or(|last| (last - aspect).abs() > GRID_ASPECT_EPSILON);
        self.last_aspect = Some(aspect);

        let batch = if incremental && !aspect_changed && self.rendered <= store.len() {
            CellBatch::newest_first(store, self.rendered, false)
        } else {
            CellBatch::newest_first(store, 0, true)
        };
        self.rendered = store.len();
        batch
    }

    /// Main image clicked in split mode. The right half steps to the older
    /// image, the left half to the newer one; both wrap around.
    pub fn click_main(&mut self, right_half: bool, store: &GalleryStore) -> Option<usize> {
        let len = store.len();
        let current = self.focus?;
        if len == 0 {
            return None;
        }
        let next = if right_half {
            (current + len - 1) % len
        } else {
            (current + 1) % len
        };
        self.focus = Some(next);
        Some(next)
    }

    /// Filmstrip thumbnail clicked; `position` counts from the newest image.
    pub fn click_strip(&mut self, position: usize, store: &GalleryStore) -> Option<usize> {
        let index = store.len().checked_sub(position + 1)?;
        self.focus = Some(index);
        Some(index)
    }
}
