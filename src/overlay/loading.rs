use cg_ui::{DragState, Point};
use web_time::Instant;

/// Image shown inside the loading overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadingImage {
    /// Placeholder until the first preview arrives
    Waiting,
    Preview(String),
}

/// Loading overlay with elapsed-time counter and live preview.
#[derive(Debug, Clone)]
pub struct LoadingOverlay {
    started: Instant,
    message: String,
    image: LoadingImage,
    pub(super) drag: DragState,
}

impl LoadingOverlay {
    pub fn new(message: impl Into<String>, position: Point, now: Instant) -> Self {
        Self {
            started: now,
            message: message.into(),
            image: LoadingImage::Waiting,
            drag: DragState::new(position),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn image(&self) -> &LoadingImage {
        &self.image
    }

    pub fn position(&self) -> Point {
        self.drag.position()
    }

    /// Whole seconds since the overlay was shown.
    pub fn elapsed_secs(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.started).as_secs()
    }

    pub fn elapsed_text(&self, now: Instant, prefix: &str, suffix: &str) -> String {
        format!("{} {} {}", prefix, self.elapsed_secs(now), suffix)
    }

    /// Swap in a preview. Returns false if it is already shown.
    pub fn show_preview(&mut self, data_uri: &str) -> bool {
        if matches!(&self.image, LoadingImage::Preview(current) if current == data_uri) {
            return false;
        }
        self.image = LoadingImage::Preview(data_uri.to_string());
        true
    }

    /// The preview failed to load; fall back to the placeholder.
    pub fn preview_failed(&mut self) {
        log::warn!("[overlay] preview failed to load");
        self.image = LoadingImage::Waiting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_elapsed_text() {
        let start = Instant::now();
        let overlay = LoadingOverlay::new("Processing...", Point::ORIGIN, start);
        let later = start + Duration::from_millis(2_900);
        assert_eq!(overlay.elapsed_text(later, "Elapsed:", "sec"), "Elapsed: 2 sec");
    }

    #[test]
    fn test_preview_swap() {
        let mut overlay = LoadingOverlay::new("", Point::ORIGIN, Instant::now());
        assert!(overlay.show_preview("data:image/png;base64,A"));
        assert!(!overlay.show_preview("data:image/png;base64,A"));
        overlay.preview_failed();
        assert_eq!(overlay.image(), &LoadingImage::Waiting);
    }
}
