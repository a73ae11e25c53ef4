//! cg_ui - headless widget state for the cg front end
//!
//! Every widget here is a plain state machine: the browser binding feeds it
//! events and renders whatever it reports back. Nothing in this crate touches
//! the DOM, so all of it runs under `cargo test`.

pub mod constants;
pub mod drag;
pub mod dropdown;
pub mod event;
pub mod geometry;
mod macros;
pub mod markup;
pub mod pan_zoom;
pub mod tag_editor;
pub mod text_core;
pub mod throttle;

pub use drag::{ClickGuard, DragEnd, DragState, ResizeState, ScrollDrag};
pub use dropdown::{DropdownChange, DropdownController, DropdownError, DropdownOption, FieldWrite};
pub use event::{Key, Modifiers, MouseButton};
pub use geometry::{Point, Rect, Size};
pub use markup::{CopyMarkup, Markup, Segment};
pub use pan_zoom::{PanDragState, PanZoomState};
pub use tag_editor::{
    InputOutcome, KeyOutcome, SuggestionItem, SuggestionRequest, TagEditor, TextEdit,
};
pub use throttle::{Debounce, DebounceToken, Throttle};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::drag::{ClickGuard, DragState, ResizeState};
    pub use crate::dropdown::{DropdownController, DropdownOption};
    pub use crate::event::{Key, Modifiers, MouseButton};
    pub use crate::geometry::{Point, Rect, Size};
    pub use crate::pan_zoom::PanZoomState;
    pub use crate::tag_editor::{TagEditor, TextEdit};
    pub use crate::throttle::{Debounce, Throttle};
}
