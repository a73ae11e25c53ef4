use cg_ui::{ClickGuard, DragEnd, DragState, Point, Size};

use crate::constants::{BUTTON_PANEL_SIZE, KEY_OVERLAY_POSITION};
use crate::storage::{self, KeyValueStore};

use super::position::{button_panel_default, load_position, save_position};

/// Result of releasing the pointer over the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelRelease {
    /// Press and release were close enough to count as a click
    pub click: bool,
    pub drag: Option<DragEnd>,
}

/// Floating panel hosting the run buttons.
#[derive(Debug, Clone)]
pub struct ButtonPanel {
    pub(super) drag: DragState,
    guard: ClickGuard,
    minimized: bool,
    visible: bool,
}

impl ButtonPanel {
    pub fn new(store: &dyn KeyValueStore, viewport: Size) -> Self {
        let mut panel = Self {
            drag: DragState::new(button_panel_default(viewport)),
            guard: ClickGuard::default(),
            minimized: false,
            visible: true,
        };
        panel.restore(store, viewport);
        panel
    }

    pub fn position(&self) -> Point {
        self.drag.position()
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Move to the saved position, or the default one, and keep it on screen.
    fn restore(&mut self, store: &dyn KeyValueStore, viewport: Size) {
        let default = button_panel_default(viewport);
        self.drag
            .set_position(load_position(store, KEY_OVERLAY_POSITION).unwrap_or(default));
        self.settle(viewport);
    }

    pub(super) fn settle(&mut self, viewport: Size) {
        if let DragEnd::Reset(_) =
            self.drag
                .settle(BUTTON_PANEL_SIZE, viewport, button_panel_default(viewport))
        {
            log::debug!("[overlay] button panel out of bounds, reset");
        }
    }

    pub fn toggle_minimized(&mut self, store: &dyn KeyValueStore, viewport: Size) -> bool {
        self.minimized = !self.minimized;
        if !self.minimized {
            self.restore(store, viewport);
        }
        self.minimized
    }

    /// Hide while a loading or error overlay is up. Reappearing restores the
    /// saved position.
    pub fn set_blocked(&mut self, blocked: bool, store: &dyn KeyValueStore, viewport: Size) {
        let visible = !blocked;
        if visible && !self.visible && !self.minimized {
            self.restore(store, viewport);
        }
        self.visible = visible;
    }

    /// Place the panel without persisting, e.g. where the loading overlay was.
    pub fn move_to(&mut self, position: Point) {
        if !self.minimized {
            self.drag.set_position(position);
        }
    }

    pub fn pointer_down(&mut self, pointer: Point) {
        self.guard.press(pointer);
        if !self.minimized {
            self.drag.begin(pointer);
        }
    }

    pub fn pointer_move(&mut self, pointer: Point) -> Option<Point> {
        self.guard.motion(pointer);
        self.drag.motion(pointer)
    }

    pub fn pointer_up(&mut self, store: &dyn KeyValueStore, viewport: Size) -> PanelRelease {
        let click = self.guard.release();
        let drag = self
            .drag
            .end(BUTTON_PANEL_SIZE, viewport, button_panel_default(viewport));
        match drag {
            Some(DragEnd::Kept(position)) if !click => {
                save_position(store, KEY_OVERLAY_POSITION, position)
            }
            Some(DragEnd::Reset(_)) => storage::forget(store, KEY_OVERLAY_POSITION),
            _ => {}
        }
        PanelRelease { click, drag }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const VIEWPORT: Size = Size {
        width: 1000.0,
        height: 800.0,
    };

    #[test]
    fn test_default_and_saved_position() {
        let store = MemoryStore::new();
        let panel = ButtonPanel::new(&store, VIEWPORT);
        assert_eq!(panel.position(), Point::new(380.0, 640.0));

        save_position(&store, KEY_OVERLAY_POSITION, Point::new(10.0, 20.0));
        let panel = ButtonPanel::new(&store, VIEWPORT);
        assert_eq!(panel.position(), Point::new(10.0, 20.0));

        // A saved position that no longer fits falls back to the default
        save_position(&store, KEY_OVERLAY_POSITION, Point::new(900.0, 20.0));
        let panel = ButtonPanel::new(&store, VIEWPORT);
        assert_eq!(panel.position(), Point::new(380.0, 640.0));
    }

    #[test]
    fn test_click_is_not_drag() {
        let store = MemoryStore::new();
        let mut panel = ButtonPanel::new(&store, VIEWPORT);

        panel.pointer_down(Point::new(400.0, 650.0));
        panel.pointer_move(Point::new(402.0, 651.0));
        let release = panel.pointer_up(&store, VIEWPORT);
        assert!(release.click);
        assert!(load_position(&store, KEY_OVERLAY_POSITION).is_none());

        panel.pointer_down(Point::new(400.0, 650.0));
        panel.pointer_move(Point::new(300.0, 550.0));
        let release = panel.pointer_up(&store, VIEWPORT);
        assert!(!release.click);
        assert_eq!(release.drag, Some(DragEnd::Kept(Point::new(282.0, 541.0))));
        assert_eq!(
            load_position(&store, KEY_OVERLAY_POSITION),
            Some(Point::new(282.0, 541.0))
        );
    }

    #[test]
    fn test_blocked_and_minimized() {
        let store = MemoryStore::new();
        let mut panel = ButtonPanel::new(&store, VIEWPORT);
        panel.set_blocked(true, &store, VIEWPORT);
        assert!(!panel.is_visible());
        panel.set_blocked(false, &store, VIEWPORT);
        assert!(panel.is_visible());

        assert!(panel.toggle_minimized(&store, VIEWPORT));
        panel.move_to(Point::new(1.0, 1.0));
        assert_eq!(panel.position(), Point::new(380.0, 640.0));
        assert!(!panel.toggle_minimized(&store, VIEWPORT));
    }
}
