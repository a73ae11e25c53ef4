//! Auxiliary info panel fed from `final_infos`.

use cg_ui::Markup;

use crate::surface::InfoBoxRender;

/// Colour of spans that carry none
const INFO_TEXT_COLOR: &str = "inherit";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoBox {
    title: String,
    html: String,
}

impl InfoBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `[color=..]` / `[url=..]` tagged text.
    pub fn update_content(&mut self, text: &str) {
        self.html = Markup::parse_tagged(text).to_html(INFO_TEXT_COLOR);
    }

    pub fn update_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn render(&self) -> InfoBoxRender {
        InfoBoxRender {
            title: self.title.clone(),
            html: self.html.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_content() {
        let mut info = InfoBox::new();
        info.update_title("Info");
        info.update_content("[color=red]warn[/color] <b> [url=https://x.example]doc[/url]");
        let render = info.render();
        assert_eq!(render.title, "Info");
        assert!(render.html.contains("<span style=\"color: red\">warn</span>"));
        assert!(render.html.contains("&lt;b&gt;"));
        assert!(render.html.contains("href=\"https://x.example\""));
    }

    #[test]
    fn test_invalid_tags_render_plain() {
        let mut info = InfoBox::new();
        info.update_content("[url=javascript:alert(1)]x[/url]");
        assert!(!info.render().html.contains("href"));
    }
}
