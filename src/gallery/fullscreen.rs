//! Fullscreen image viewer with pan and zoom.

use cg_ui::{Key, PanZoomState, Point};

/// What a key press in fullscreen did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenAction {
    Ignored,
    /// Show image `index`
    Show(usize),
    /// Leave fullscreen; `index` becomes the split-mode focus
    Exit(usize),
}

/// Open fullscreen viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct FullscreenViewer {
    index: usize,
    pan_zoom: PanZoomState,
}

impl FullscreenViewer {
    pub fn open(index: usize) -> Self {
        Self {
            index,
            pan_zoom: PanZoomState::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn pan_zoom(&self) -> &PanZoomState {
        &self.pan_zoom
    }

    /// `len` is the gallery size. ArrowRight and Space step to the older
    /// image, ArrowLeft to the newer one.
    pub fn on_key(&mut self, key: Key, len: usize) -> FullscreenAction {
        if len == 0 {
            return FullscreenAction::Exit(0);
        }
        match key {
            Key::Escape => FullscreenAction::Exit(self.index),
            Key::Right | Key::Space => self.show((self.index + len - 1) % len),
            Key::Left => self.show((self.index + 1) % len),
            _ => FullscreenAction::Ignored,
        }
    }

    fn show(&mut self, index: usize) -> FullscreenAction {
        self.index = index;
        self.pan_zoom = PanZoomState::new();
        FullscreenAction::Show(index)
    }

    /// Click on the backdrop around the image.
    pub fn click_background(&self) -> FullscreenAction {
        FullscreenAction::Exit(self.index)
    }

    pub fn wheel(&mut self, delta_y: f32) -> String {
        self.pan_zoom.wheel(delta_y);
        self.pan_zoom.css_transform()
    }

    pub fn pointer_down(&mut self, pointer: Point) {
        self.pan_zoom.begin_pan(pointer);
    }

    /// Returns the new CSS transform while panning.
    pub fn pointer_move(&mut self, pointer: Point) -> Option<String> {
        self.pan_zoom
            .pan_to(pointer)
            .then(|| self.pan_zoom.css_transform())
    }

    pub fn pointer_up(&mut self) {
        self.pan_zoom.end_pan();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_cycle_and_exit() {
        let mut viewer = FullscreenViewer::open(2);
        assert_eq!(viewer.on_key(Key::Right, 3), FullscreenAction::Show(1));
        assert_eq!(viewer.on_key(Key::Space, 3), FullscreenAction::Show(0));
        assert_eq!(viewer.on_key(Key::Left, 3), FullscreenAction::Show(1));
        assert_eq!(viewer.on_key(Key::Left, 3), FullscreenAction::Show(2));
        assert_eq!(viewer.on_key(Key::Left, 3), FullscreenAction::Show(0));
        assert_eq!(viewer.on_key(Key::Char('x'), 3), FullscreenAction::Ignored);
        assert_eq!(viewer.on_key(Key::Escape, 3), FullscreenAction::Exit(2));
        assert_eq!(viewer.click_background(), FullscreenAction::Exit(2));
    }

    #[test]
    fn test_zoom_and_pan() {
        let mut viewer = FullscreenViewer::open(0);
        viewer.wheel(-500.0);
        assert!((viewer.pan_zoom().scale - 1.5).abs() < 1e-4);
        viewer.wheel(-10_000.0);
        assert_eq!(viewer.pan_zoom().scale, 4.0);

        assert!(viewer.pointer_move(Point::new(5.0, 5.0)).is_none());
        viewer.pointer_down(Point::new(10.0, 10.0));
        assert_eq!(
            viewer.pointer_move(Point::new(30.0, 0.0)).as_deref(),
            Some("translate(20px, -10px) scale(4)")
        );
        viewer.pointer_up();
        assert!(viewer.pointer_move(Point::new(0.0, 0.0)).is_none());

        // Switching images resets the transform
        viewer.on_key(Key::Right, 2);
        assert_eq!(viewer.pan_zoom().scale, 1.0);
    }
}
