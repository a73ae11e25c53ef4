//! Rendering seam between the headless state and the page.
//!
//! [`crate::app::Frontend`] turns state changes into the view models below
//! and hands them to a [`UiSurface`]. The browser build implements it on the
//! DOM; tests record the calls.

use cg_ui::{FieldWrite, Point, Size, TextEdit};

use crate::gallery::{CellBatch, GalleryCell, GalleryMode, GridLayout};
use crate::thumbs::ThumbMode;

/// Main gallery update.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryRender {
    pub mode: GalleryMode,
    pub batch: CellBatch,
    /// Image shown large in split mode
    pub focused: Option<GalleryCell>,
    /// Mode-switch button text
    pub label: String,
    /// Set in grid mode
    pub grid: Option<GridLayout>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FullscreenRender {
    pub index: usize,
    pub data_uri: String,
    /// CSS transform of the image
    pub transform: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbsRender {
    pub images: Vec<String>,
    pub mode: ThumbMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadingRender {
    pub position: Point,
    pub message: String,
    pub elapsed: String,
    /// `None` shows the waiting placeholder
    pub preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRender {
    pub html: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomRender {
    pub position: Point,
    pub size: Size,
    pub html: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelRender {
    pub position: Point,
    pub minimized: bool,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrivacyBallRender {
    pub id: u32,
    pub position: Point,
    /// Edge length; balls are round
    pub size: f32,
    pub font_size: f32,
    /// Being moved with the left button
    pub dragging: bool,
}

/// Character thumbnail beside the character dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbOverlayRender {
    pub position: Point,
    pub image: String,
}

/// Strips that scroll by dragging their content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    /// Split-mode thumbnails under the main image
    Filmstrip,
    /// Thumbnail gallery in scroll mode
    Thumbs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoBoxRender {
    pub title: String,
    pub html: String,
}

/// Open suggestion box of one input.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionRender {
    /// Candidate markup as delivered by the completion service
    pub items: Vec<String>,
    pub selected: Option<usize>,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownRender {
    pub labels: Vec<String>,
    /// Text in each field's input
    pub displayed: Vec<String>,
    pub active: Option<usize>,
    pub open: bool,
    /// `(key, label)` of the open list
    pub items: Vec<(String, String)>,
    pub searchable: bool,
}

/// Everything the front end draws.
///
/// `None` arguments remove the corresponding element.
pub trait UiSurface {
    fn render_gallery(&mut self, render: &GalleryRender);
    fn render_fullscreen(&mut self, render: Option<&FullscreenRender>);
    fn render_thumbs(&mut self, render: Option<&ThumbsRender>);
    fn render_loading(&mut self, render: Option<&LoadingRender>);
    fn render_error(&mut self, render: Option<&ErrorRender>);
    fn render_custom(&mut self, render: Option<&CustomRender>);
    fn render_panel(&mut self, render: &PanelRender);
    /// Every privacy ball currently on screen.
    fn render_privacy(&mut self, balls: &[PrivacyBallRender]);
    fn render_thumb_overlay(&mut self, render: Option<&ThumbOverlayRender>);
    /// `Some(scroll_left)` while a drag scrolls `target`, `None` once released.
    fn render_scroll_drag(&mut self, target: ScrollTarget, scroll_left: Option<f32>);
    fn render_info_box(&mut self, render: &InfoBoxRender);
    fn render_suggestions(&mut self, input: &str, render: Option<&SuggestionRender>);
    fn render_dropdown(&mut self, container: &str, render: &DropdownRender);

    /// Current value and caret (byte offset) of a prompt input.
    fn input_state(&self, input: &str) -> Option<(String, usize)>;
    /// Replace the value and caret of a prompt input.
    fn write_input(&mut self, input: &str, edit: &TextEdit);
    /// Write into the text field bound to a dropdown slot.
    fn write_field(&mut self, container: &str, write: &FieldWrite);
    /// Notify listeners of a dropdown selection.
    fn dropdown_changed(&mut self, container: &str, values: &[String]);
    /// Show or hide the hover preview of a dropdown.
    fn hover_preview(&mut self, container: &str, key: Option<&str>);

    fn seed_input(&self) -> Option<i64>;
    fn set_seed_input(&mut self, seed: i64);
    /// Inner width of the gallery container, for grid layout
    fn gallery_width(&self) -> f32;
}

/// System clipboard. Failures are logged by the implementation.
pub trait Clipboard {
    fn write_text(&self, text: &str);
}
