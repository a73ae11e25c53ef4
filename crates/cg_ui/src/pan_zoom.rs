//! Pan and zoom state for the fullscreen image viewer.

use crate::constants::{FULLSCREEN_ZOOM_MAX, FULLSCREEN_ZOOM_MIN, WHEEL_ZOOM_SENSITIVITY};
use crate::geometry::Point;

/// State machine for drag-to-pan interactions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PanDragState {
    /// Not dragging
    #[default]
    Idle,
    /// Dragging with last mouse position (screen space)
    Dragging { last_pos: Point },
}

impl PanDragState {
    /// Check if currently dragging
    pub fn is_dragging(&self) -> bool {
        matches!(self, PanDragState::Dragging { .. })
    }

    /// Get the last drag position if dragging
    pub fn last_pos(&self) -> Option<Point> {
        match self {
            PanDragState::Dragging { last_pos } => Some(*last_pos),
            PanDragState::Idle => None,
        }
    }

    /// Start dragging with the given position
    pub fn start_drag(&mut self, pos: Point) {
        *self = PanDragState::Dragging { last_pos: pos };
    }

    /// Update last position during drag
    pub fn update_pos(&mut self, pos: Point) {
        if let PanDragState::Dragging { last_pos } = self {
            *last_pos = pos;
        }
    }

    /// Stop dragging
    pub fn stop_drag(&mut self) {
        *self = PanDragState::Idle;
    }
}

/// Translation and scale applied to the fullscreen image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanZoomState {
    pub translate: Point,
    pub scale: f32,
    pub drag: PanDragState,
}

impl Default for PanZoomState {
    fn default() -> Self {
        Self {
            translate: Point::ORIGIN,
            scale: 1.0,
            drag: PanDragState::Idle,
        }
    }
}

impl PanZoomState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a wheel event. Scrolling up (negative delta) zooms in.
    pub fn wheel(&mut self, delta_y: f32) {
        let scale = self.scale - delta_y * WHEEL_ZOOM_SENSITIVITY;
        self.scale = scale.clamp(FULLSCREEN_ZOOM_MIN, FULLSCREEN_ZOOM_MAX);
    }

    pub fn begin_pan(&mut self, pointer: Point) {
        self.drag.start_drag(pointer);
    }

    /// Move by the pointer delta since the last event. Returns false when not
    /// panning.
    pub fn pan_to(&mut self, pointer: Point) -> bool {
        let Some(last) = self.drag.last_pos() else {
            return false;
        };
        let (dx, dy) = pointer.delta_from(last);
        self.translate.x += dx;
        self.translate.y += dy;
        self.drag.update_pos(pointer);
        true
    }

    pub fn end_pan(&mut self) {
        self.drag.stop_drag();
    }

    /// CSS `transform` value for the current state.
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate.x, self.translate.y, self.scale
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pan_drag_state() {
        let mut state = PanDragState::default();
        assert!(!state.is_dragging());
        state.start_drag(Point::new(1.0, 2.0));
        assert_eq!(state.last_pos(), Some(Point::new(1.0, 2.0)));
        state.update_pos(Point::new(3.0, 4.0));
        assert_eq!(state.last_pos(), Some(Point::new(3.0, 4.0)));
        state.stop_drag();
        assert_eq!(state.last_pos(), None);
    }

    #[test]
    fn test_wheel_clamps() {
        let mut view = PanZoomState::new();
        view.wheel(-500.0);
        assert!((view.scale - 1.5).abs() < 1e-5);
        view.wheel(-10_000.0);
        assert_eq!(view.scale, FULLSCREEN_ZOOM_MAX);
        view.wheel(10_000.0);
        assert_eq!(view.scale, FULLSCREEN_ZOOM_MIN);
    }

    #[test]
    fn test_pan_accumulates() {
        let mut view = PanZoomState::new();
        assert!(!view.pan_to(Point::new(5.0, 5.0)));

        view.begin_pan(Point::new(10.0, 10.0));
        assert!(view.pan_to(Point::new(15.0, 20.0)));
        assert!(view.pan_to(Point::new(20.0, 20.0)));
        view.end_pan();
        assert_eq!(view.translate, Point::new(10.0, 10.0));
        assert_eq!(view.css_transform(), "translate(10px, 10px) scale(1)");
    }
}
