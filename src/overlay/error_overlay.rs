use cg_ui::CopyMarkup;

use crate::constants::ERROR_TEXT_COLOR;

/// Backend error shown until clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorOverlay {
    copy: CopyMarkup,
}

impl ErrorOverlay {
    pub fn new(message: &str) -> Self {
        Self {
            copy: CopyMarkup::parse(message),
        }
    }

    pub fn html(&self) -> String {
        self.copy.markup.to_html(ERROR_TEXT_COLOR)
    }

    pub fn copy_payload(&self) -> &str {
        &self.copy.copy_payload
    }

    /// The overlay was clicked. Returns the text to copy, or `None` when the
    /// click hit a link, which opens instead and keeps the overlay.
    pub fn click(&self, on_link: bool) -> Option<String> {
        (!on_link).then(|| self.copy.copy_payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_precedence() {
        let overlay = ErrorOverlay::new(
            "see [COPY_URL]https://a.example/x[/COPY_URL] or [COPY_CUSTOM=#ff0000]code 7[/COPY_CUSTOM]",
        );
        assert_eq!(overlay.copy_payload(), "https://a.example/x");
        assert_eq!(overlay.click(true), None);
        assert_eq!(overlay.click(false).as_deref(), Some("https://a.example/x"));

        let overlay = ErrorOverlay::new("[COPY_CUSTOM]a[/COPY_CUSTOM] [COPY_CUSTOM]b[/COPY_CUSTOM]");
        assert_eq!(overlay.copy_payload(), "b");

        let overlay = ErrorOverlay::new("plain <failure>");
        assert_eq!(overlay.copy_payload(), "plain <failure>");
        assert!(overlay.html().contains("&lt;failure&gt;"));
    }
}
