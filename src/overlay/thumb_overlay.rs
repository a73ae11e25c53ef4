use cg_ui::constants::DROPDOWN_MAX_WIDTH;
use cg_ui::{Point, Rect, Size};

use crate::constants::{THUMB_OVERLAY_GAP, THUMB_OVERLAY_MARGIN, THUMB_OVERLAY_SIZE};
use crate::surface::ThumbOverlayRender;

/// Where the hovered option sits on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverAnchor {
    /// Width of the active field's input
    pub input_width: f32,
    /// Bounds of the open option list
    pub list: Rect,
    /// Top edge of the hovered option
    pub item_top: f32,
}

/// Overlay origin next to the option list of character field `field`.
///
/// The first two fields show it to the right of the list, the third to the
/// left. Other fields have no overlay. The top follows the hovered option and
/// stays [`THUMB_OVERLAY_MARGIN`] away from the viewport edges.
pub fn place_thumb_overlay(field: usize, anchor: &HoverAnchor, viewport: Size) -> Option<Point> {
    let size = THUMB_OVERLAY_SIZE;
    let left = match field {
        0 | 1 => anchor.list.x + anchor.input_width.min(DROPDOWN_MAX_WIDTH) + THUMB_OVERLAY_GAP,
        2 => anchor.list.x - size.width - THUMB_OVERLAY_MARGIN,
        _ => return None,
    };
    let mut top = anchor.item_top;
    if top + size.height > viewport.height - THUMB_OVERLAY_MARGIN {
        top = viewport.height - size.height - THUMB_OVERLAY_MARGIN;
    }
    if top < THUMB_OVERLAY_MARGIN {
        top = THUMB_OVERLAY_MARGIN;
    }
    Some(Point::new(left, top))
}

/// Character thumbnail shown beside the character dropdown while hovering
/// its options.
///
/// The page pushes a thumbnail per character name; a repeat of the last name
/// is ignored. The overlay is visible while an option is hovered and a
/// thumbnail is held.
#[derive(Debug, Clone, Default)]
pub struct ThumbOverlay {
    last_character: Option<String>,
    image: Option<String>,
    position: Option<Point>,
}

impl ThumbOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in the thumbnail of `character`. An empty `image` clears it.
    ///
    /// Returns false when `character` repeats the previous call.
    pub fn update(&mut self, character: &str, image: Option<String>) -> bool {
        if self.last_character.as_deref() == Some(character) {
            return false;
        }
        self.last_character = Some(character.to_string());
        self.image = image.filter(|uri| !uri.is_empty());
        true
    }

    /// An option of character field `field` is hovered.
    pub fn show(&mut self, field: usize, anchor: &HoverAnchor, viewport: Size) {
        self.position = place_thumb_overlay(field, anchor, viewport);
    }

    pub fn hide(&mut self) {
        self.position = None;
    }

    pub fn render(&self) -> Option<ThumbOverlayRender> {
        Some(ThumbOverlayRender {
            position: self.position?,
            image: self.image.clone()?,
        })
    }
}
