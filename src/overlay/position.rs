//! Persisted overlay geometry and default placements.

use cg_ui::constants::{OVERLAY_MAX_SIZE, OVERLAY_MIN_HEIGHT, OVERLAY_MIN_WIDTH};
use cg_ui::{Point, Size};
use serde::{Deserialize, Serialize};

use crate::constants::{
    BUTTON_PANEL_ANCHOR_Y, BUTTON_PANEL_WIDTH, CUSTOM_OVERLAY_ANCHOR_Y, LOADING_ANCHOR_Y,
    LOADING_OVERLAY_SIZE,
};
use crate::storage::{self, KeyValueStore};

/// Saved top-left corner of an overlay, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayPosition {
    pub top: f32,
    pub left: f32,
}

impl From<Point> for OverlayPosition {
    fn from(point: Point) -> Self {
        Self {
            top: point.y,
            left: point.x,
        }
    }
}

impl From<OverlayPosition> for Point {
    fn from(position: OverlayPosition) -> Self {
        Point::new(position.left, position.top)
    }
}

/// Saved size of the custom overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlaySize {
    pub width: f32,
    pub height: f32,
}

impl OverlaySize {
    /// Whether a saved size is sane enough to restore.
    pub fn is_acceptable(&self) -> bool {
        (OVERLAY_MIN_WIDTH..=OVERLAY_MAX_SIZE).contains(&self.width)
            && (OVERLAY_MIN_HEIGHT..=OVERLAY_MAX_SIZE).contains(&self.height)
    }
}

impl From<Size> for OverlaySize {
    fn from(size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

impl From<OverlaySize> for Size {
    fn from(size: OverlaySize) -> Self {
        Size::new(size.width, size.height)
    }
}

pub fn load_position(store: &dyn KeyValueStore, key: &str) -> Option<Point> {
    storage::load_json::<OverlayPosition>(store, key).map(Point::from)
}

pub fn save_position(store: &dyn KeyValueStore, key: &str, position: Point) {
    storage::persist(store, key, &OverlayPosition::from(position));
}

pub fn load_size(store: &dyn KeyValueStore, key: &str) -> Option<Size> {
    storage::load_json::<OverlaySize>(store, key)
        .filter(OverlaySize::is_acceptable)
        .map(Size::from)
}

pub fn save_size(store: &dyn KeyValueStore, key: &str, size: Size) {
    storage::persist(store, key, &OverlaySize::from(size));
}

/// Horizontally centred, anchored at 20 % of the viewport height.
pub fn loading_default(viewport: Size) -> Point {
    Point::new(
        (viewport.width - LOADING_OVERLAY_SIZE.width) * 0.5,
        viewport.height * LOADING_ANCHOR_Y - LOADING_OVERLAY_SIZE.height * LOADING_ANCHOR_Y,
    )
}

pub fn button_panel_default(viewport: Size) -> Point {
    Point::new(
        viewport.width * 0.5 - BUTTON_PANEL_WIDTH * 0.5,
        viewport.height * BUTTON_PANEL_ANCHOR_Y,
    )
}

pub fn custom_default(viewport: Size, size: Size) -> Point {
    Point::new(
        viewport.width * 0.5 - size.width * 0.5,
        viewport.height * CUSTOM_OVERLAY_ANCHOR_Y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_position_roundtrip_and_format() {
        let store = MemoryStore::new();
        save_position(&store, "p", Point::new(12.0, 34.0));
        assert_eq!(
            store.get("p").unwrap().as_deref(),
            Some(r#"{"top":34.0,"left":12.0}"#)
        );
        assert_eq!(load_position(&store, "p"), Some(Point::new(12.0, 34.0)));
    }

    #[test]
    fn test_size_range() {
        let store = MemoryStore::new();
        save_size(&store, "s", Size::new(100.0, 400.0));
        assert_eq!(load_size(&store, "s"), None);
        save_size(&store, "s", Size::new(640.0, 480.0));
        assert_eq!(load_size(&store, "s"), Some(Size::new(640.0, 480.0)));
        assert!(!OverlaySize { width: 800.0, height: 1700.0 }.is_acceptable());
    }

    #[test]
    fn test_defaults() {
        let viewport = Size::new(1000.0, 800.0);
        assert_eq!(button_panel_default(viewport), Point::new(380.0, 640.0));
        assert_eq!(
            custom_default(viewport, Size::new(600.0, 800.0)),
            Point::new(200.0, 80.0)
        );
        assert_eq!(loading_default(viewport), Point::new(350.0, 116.0));
    }
}
