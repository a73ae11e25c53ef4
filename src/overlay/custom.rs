use cg_ui::drag::fit_within;
use cg_ui::{CopyMarkup, DragEnd, DragState, Point, Rect, ResizeState, Size};

use crate::constants::{
    CUSTOM_OVERLAY_DEFAULT_SIZE, CUSTOM_TEXT_COLOR, KEY_CUSTOM_OVERLAY_POSITION,
    KEY_CUSTOM_OVERLAY_SIZE,
};
use crate::storage::{self, KeyValueStore};

use super::position::{custom_default, load_position, load_size, save_position, save_size};

const DATA_URI_PREFIX: &str = "data:";

/// Draggable, resizable info overlay.
#[derive(Debug, Clone)]
pub struct CustomOverlay {
    html: String,
    image: Option<String>,
    pub(super) drag: DragState,
    pub(super) resize: ResizeState,
}

impl CustomOverlay {
    /// Open with the saved size and position, then shrink to fit `viewport`.
    /// Only `data:` URIs are shown as images.
    pub fn open(
        message: &str,
        image: Option<String>,
        store: &dyn KeyValueStore,
        viewport: Size,
    ) -> Self {
        let size = load_size(store, KEY_CUSTOM_OVERLAY_SIZE).unwrap_or(CUSTOM_OVERLAY_DEFAULT_SIZE);
        let position = load_position(store, KEY_CUSTOM_OVERLAY_POSITION)
            .unwrap_or_else(|| custom_default(viewport, size));

        let image = image.filter(|uri| {
            let ok = uri.starts_with(DATA_URI_PREFIX);
            if !ok {
                log::warn!("[overlay] ignoring non-data image in custom overlay");
            }
            ok
        });

        let mut overlay = Self {
            html: CopyMarkup::parse(message).markup.to_html(CUSTOM_TEXT_COLOR),
            image,
            drag: DragState::new(position),
            resize: ResizeState::new(size),
        };
        overlay.fit(store, viewport);
        overlay
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn position(&self) -> Point {
        self.drag.position()
    }

    pub fn size(&self) -> Size {
        self.resize.size()
    }

    pub fn image_failed(&mut self) {
        log::warn!("[overlay] custom overlay image failed to load, removing it");
        self.image = None;
    }

    /// Shrink so the bottom-right corner stays inside the viewport.
    pub fn fit(&mut self, store: &dyn KeyValueStore, viewport: Size) {
        let rect = Rect::from_origin_size(self.position(), self.size());
        if let Some(size) = fit_within(rect, viewport) {
            self.resize.set_size(size);
            save_size(store, KEY_CUSTOM_OVERLAY_SIZE, size);
        }
    }

    pub(super) fn finish_drag(&mut self, store: &dyn KeyValueStore, viewport: Size) {
        let default = custom_default(viewport, self.size());
        match self.drag.end(self.size(), viewport, default) {
            Some(DragEnd::Kept(position)) => {
                save_position(store, KEY_CUSTOM_OVERLAY_POSITION, position)
            }
            Some(DragEnd::Reset(_)) => storage::forget(store, KEY_CUSTOM_OVERLAY_POSITION),
            None => {}
        }
    }

    pub(super) fn finish_resize(&mut self, store: &dyn KeyValueStore) {
        if let Some(size) = self.resize.end() {
            save_size(store, KEY_CUSTOM_OVERLAY_SIZE, size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const VIEWPORT: Size = Size {
        width: 1200.0,
        height: 1000.0,
    };

    #[test]
    fn test_open_defaults_and_image_filter() {
        let store = MemoryStore::new();
        let overlay = CustomOverlay::open("hi", Some("https://x/y.png".into()), &store, VIEWPORT);
        assert_eq!(overlay.image(), None);
        assert_eq!(overlay.position(), Point::new(300.0, 100.0));
        // 100 + 800 fits inside 1000 - 10
        assert_eq!(overlay.size(), CUSTOM_OVERLAY_DEFAULT_SIZE);

        let overlay = CustomOverlay::open("hi", Some("data:image/png;base64,A".into()), &store, VIEWPORT);
        assert_eq!(overlay.image(), Some("data:image/png;base64,A"));
    }

    #[test]
    fn test_open_shrinks_to_viewport() {
        let store = MemoryStore::new();
        let small = Size::new(1200.0, 600.0);
        let overlay = CustomOverlay::open("hi", None, &store, small);
        // top = 60, so height = 600 - 60 - 10
        assert_eq!(overlay.size(), Size::new(600.0, 530.0));
        assert_eq!(load_size(&store, KEY_CUSTOM_OVERLAY_SIZE), Some(Size::new(600.0, 530.0)));
    }

    #[test]
    fn test_drag_out_of_viewport_forgets_position() {
        let store = MemoryStore::new();
        let mut overlay = CustomOverlay::open("hi", None, &store, VIEWPORT);

        overlay.drag.begin(Point::new(310.0, 110.0));
        overlay.drag.motion(Point::new(60.0, 20.0));
        overlay.finish_drag(&store, VIEWPORT);
        assert_eq!(overlay.position(), Point::new(50.0, 10.0));
        assert!(load_position(&store, KEY_CUSTOM_OVERLAY_POSITION).is_some());

        overlay.drag.begin(Point::new(60.0, 20.0));
        overlay.drag.motion(Point::new(1100.0, 20.0));
        overlay.finish_drag(&store, VIEWPORT);
        assert_eq!(overlay.position(), Point::new(300.0, 100.0));
        assert!(load_position(&store, KEY_CUSTOM_OVERLAY_POSITION).is_none());
    }
}
