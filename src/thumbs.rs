//! Secondary thumbnail strip, replaced wholesale from outside.

use cg_ui::Size;

use crate::constants::THUMB_HEIGHT_DIVISOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThumbMode {
    Grid,
    /// Single horizontally scrolling row
    #[default]
    Scroll,
}

#[derive(Debug, Clone, Default)]
pub struct ThumbGallery {
    images: Vec<String>,
    mode: ThumbMode,
}

impl ThumbGallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn mode(&self) -> ThumbMode {
        self.mode
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Replace the thumbnails. Returns false when the list is now empty and
    /// the strip and its mode button should be removed.
    pub fn update(&mut self, images: Vec<String>) -> bool {
        self.images = images;
        log::debug!("[thumbs] {} images", self.images.len());
        !self.images.is_empty()
    }

    pub fn toggle_mode(&mut self) -> ThumbMode {
        self.mode = match self.mode {
            ThumbMode::Grid => ThumbMode::Scroll,
            ThumbMode::Scroll => ThumbMode::Grid,
        };
        self.mode
    }

    /// Grid cell size for a container `container_height` tall showing images
    /// of `aspect` (width / height).
    pub fn cell_size(container_height: f32, aspect: f32) -> Size {
        let height = container_height / THUMB_HEIGHT_DIVISOR;
        Size::new(height * aspect, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_and_clear() {
        let mut thumbs = ThumbGallery::new();
        assert!(thumbs.update(vec!["a".into(), "b".into()]));
        assert_eq!(thumbs.images().len(), 2);
        assert!(!thumbs.update(Vec::new()));
        assert!(thumbs.is_empty());
    }

    #[test]
    fn test_mode_and_cell_size() {
        let mut thumbs = ThumbGallery::new();
        assert_eq!(thumbs.mode(), ThumbMode::Scroll);
        assert_eq!(thumbs.toggle_mode(), ThumbMode::Grid);
        assert_eq!(thumbs.toggle_mode(), ThumbMode::Scroll);

        let size = ThumbGallery::cell_size(240.0, 0.5);
        assert!((size.width - 100.0).abs() < 1e-3);
        assert!((size.height - 200.0).abs() < 1e-3);
    }
}
