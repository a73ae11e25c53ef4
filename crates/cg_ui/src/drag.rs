//! Drag, resize and click-vs-drag state machines for floating panels.

use crate::constants::{
    CLICK_MOVE_THRESHOLD, OVERLAY_FIT_PADDING, OVERLAY_MIN_HEIGHT, OVERLAY_MIN_WIDTH,
    RESIZE_HANDLE_OFFSET,
};
use crate::geometry::{Point, Rect, Size};

/// Outcome of releasing a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEnd {
    /// Panel stays where it was dropped; persist this position.
    Kept(Point),
    /// Panel left the viewport and was moved back to its default position;
    /// any saved position should be forgotten.
    Reset(Point),
}

impl DragEnd {
    pub fn position(&self) -> Point {
        match self {
            DragEnd::Kept(p) | DragEnd::Reset(p) => *p,
        }
    }
}

/// Moves a panel by its grab point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    /// Pointer offset from the panel origin while dragging
    grab: Option<(f32, f32)>,
    position: Point,
}

impl DragState {
    pub fn new(position: Point) -> Self {
        Self {
            grab: None,
            position,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Place the panel without a drag, e.g. when syncing from another panel.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    pub fn begin(&mut self, pointer: Point) {
        self.grab = Some(pointer.delta_from(self.position));
    }

    /// Pointer moved. Returns the new panel origin while dragging.
    pub fn motion(&mut self, pointer: Point) -> Option<Point> {
        let (dx, dy) = self.grab?;
        self.position = Point::new(pointer.x - dx, pointer.y - dy);
        Some(self.position)
    }

    /// Release the drag. `size` is the panel size and `default` the position
    /// to fall back to when any edge ended up outside the viewport.
    pub fn end(&mut self, size: Size, viewport: Size, default: Point) -> Option<DragEnd> {
        self.grab.take()?;
        Some(self.settle(size, viewport, default))
    }

    /// Release the drag wherever the panel ended up.
    pub fn release(&mut self) -> Option<Point> {
        self.grab.take().map(|_| self.position)
    }

    /// Move back to `default` if the panel is not fully inside the viewport.
    pub fn settle(&mut self, size: Size, viewport: Size, default: Point) -> DragEnd {
        let rect = Rect::from_origin_size(self.position, size);
        if rect.is_inside(viewport) {
            DragEnd::Kept(self.position)
        } else {
            self.position = default;
            DragEnd::Reset(default)
        }
    }
}

/// Bottom-right corner resize with a minimum size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResizeState {
    start: Option<(Point, Size)>,
    size: Size,
}

impl ResizeState {
    pub fn new(size: Size) -> Self {
        Self { start: None, size }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn is_resizing(&self) -> bool {
        self.start.is_some()
    }

    pub fn begin(&mut self, pointer: Point) {
        self.start = Some((pointer, self.size));
    }

    pub fn motion(&mut self, pointer: Point) -> Option<Size> {
        let (origin, start_size) = self.start?;
        let (dx, dy) = pointer.delta_from(origin);
        self.size = Size::new(
            (start_size.width + dx).max(OVERLAY_MIN_WIDTH),
            (start_size.height + dy).max(OVERLAY_MIN_HEIGHT),
        );
        Some(self.size)
    }

    /// Finish resizing; returns the size to persist.
    pub fn end(&mut self) -> Option<Size> {
        self.start.take().map(|_| self.size)
    }
}

/// Tells a click from a drag that started on the same element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClickGuard {
    press: Option<Point>,
    moved: bool,
}

impl ClickGuard {
    pub fn press(&mut self, pointer: Point) {
        self.press = Some(pointer);
        self.moved = false;
    }

    pub fn motion(&mut self, pointer: Point) {
        if let Some(start) = self.press {
            if !start.within(pointer, CLICK_MOVE_THRESHOLD) {
                self.moved = true;
            }
        }
    }

    /// Returns true if the press/release pair counts as a click.
    pub fn release(&mut self) -> bool {
        let was_pressed = self.press.take().is_some();
        was_pressed && !std::mem::take(&mut self.moved)
    }
}

/// Scrolls a horizontally overflowing strip by dragging its content.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollDrag {
    /// Pointer x and scroll offset at press time
    start: Option<(f32, f32)>,
}

impl ScrollDrag {
    pub fn is_dragging(&self) -> bool {
        self.start.is_some()
    }

    pub fn begin(&mut self, pointer_x: f32, scroll_left: f32) {
        self.start = Some((pointer_x, scroll_left));
    }

    /// New scroll offset; content follows the pointer.
    pub fn motion(&mut self, pointer_x: f32) -> Option<f32> {
        let (start_x, start_scroll) = self.start?;
        Some((start_scroll - (pointer_x - start_x)).max(0.0))
    }

    pub fn end(&mut self) -> bool {
        self.start.take().is_some()
    }
}

/// Shrink a panel so its bottom-right corner stays inside the viewport.
///
/// Returns the new size when it changed.
pub fn fit_within(rect: Rect, viewport: Size) -> Option<Size> {
    let right = rect.right() - RESIZE_HANDLE_OFFSET;
    let bottom = rect.bottom() - RESIZE_HANDLE_OFFSET;

    let mut size = rect.size();
    if right > viewport.width - OVERLAY_FIT_PADDING {
        size.width = (viewport.width - rect.x - OVERLAY_FIT_PADDING).max(OVERLAY_MIN_WIDTH);
    }
    if bottom > viewport.height - OVERLAY_FIT_PADDING {
        size.height = (viewport.height - rect.y - OVERLAY_FIT_PADDING).max(OVERLAY_MIN_HEIGHT);
    }

    (size != rect.size()).then_some(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size {
        width: 1000.0,
        height: 800.0,
    };

    #[test]
    fn test_drag_follows_grab_point() {
        let mut drag = DragState::new(Point::new(100.0, 100.0));
        assert_eq!(drag.motion(Point::new(0.0, 0.0)), None);

        drag.begin(Point::new(110.0, 105.0));
        assert_eq!(drag.motion(Point::new(210.0, 305.0)), Some(Point::new(200.0, 300.0)));

        let end = drag.end(Size::new(100.0, 50.0), VIEWPORT, Point::ORIGIN);
        assert_eq!(end, Some(DragEnd::Kept(Point::new(200.0, 300.0))));
        assert!(!drag.is_dragging());
        assert_eq!(drag.end(Size::new(1.0, 1.0), VIEWPORT, Point::ORIGIN), None);
    }

    #[test]
    fn test_drag_out_of_bounds_resets() {
        let mut drag = DragState::new(Point::new(10.0, 10.0));
        drag.begin(Point::new(10.0, 10.0));
        drag.motion(Point::new(950.0, 10.0));
        let default = Point::new(380.0, 640.0);
        let end = drag.end(Size::new(240.0, 100.0), VIEWPORT, default);
        assert_eq!(end, Some(DragEnd::Reset(default)));
        assert_eq!(drag.position(), default);
    }

    #[test]
    fn test_resize_minimum() {
        let mut resize = ResizeState::new(Size::new(600.0, 800.0));
        resize.begin(Point::new(600.0, 800.0));
        assert_eq!(resize.motion(Point::new(0.0, 0.0)), Some(Size::new(200.0, 150.0)));
        assert_eq!(resize.motion(Point::new(650.0, 820.0)), Some(Size::new(650.0, 820.0)));
        assert_eq!(resize.end(), Some(Size::new(650.0, 820.0)));
        assert_eq!(resize.end(), None);
    }

    #[test]
    fn test_click_guard() {
        let mut guard = ClickGuard::default();
        guard.press(Point::new(0.0, 0.0));
        guard.motion(Point::new(3.0, 4.0));
        assert!(guard.release());

        guard.press(Point::new(0.0, 0.0));
        guard.motion(Point::new(6.0, 0.0));
        guard.motion(Point::new(0.0, 0.0));
        assert!(!guard.release());

        // Release without press
        assert!(!guard.release());
    }

    #[test]
    fn test_release_keeps_position() {
        let mut drag = DragState::new(Point::new(950.0, 10.0));
        drag.begin(Point::new(960.0, 20.0));
        drag.motion(Point::new(1990.0, 20.0));
        assert_eq!(drag.release(), Some(Point::new(1980.0, 10.0)));
        assert_eq!(drag.release(), None);
    }

    #[test]
    fn test_scroll_drag() {
        let mut scroll = ScrollDrag::default();
        assert_eq!(scroll.motion(50.0), None);

        scroll.begin(300.0, 120.0);
        // Dragging left reveals content to the right
        assert_eq!(scroll.motion(250.0), Some(170.0));
        assert_eq!(scroll.motion(340.0), Some(80.0));
        assert_eq!(scroll.motion(900.0), Some(0.0));
        assert!(scroll.end());
        assert!(!scroll.end());
        assert_eq!(scroll.motion(0.0), None);
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(Rect::new(100.0, 100.0, 300.0, 300.0), VIEWPORT), None);

        let fitted = fit_within(Rect::new(500.0, 100.0, 600.0, 800.0), VIEWPORT);
        assert_eq!(fitted, Some(Size::new(490.0, 690.0)));

        // Never below the minimum size
        let fitted = fit_within(Rect::new(950.0, 750.0, 600.0, 800.0), VIEWPORT);
        assert_eq!(fitted, Some(Size::new(200.0, 150.0)));
    }
}
