//! Inline markup used by overlays and the info box.
//!
//! Two tag dialects are understood:
//!
//! - copy markup, `[COPY_URL]https://..[/COPY_URL]` and
//!   `[COPY_CUSTOM=color]text[/COPY_CUSTOM]`, used in error and custom
//!   overlays; it also decides what a click copies to the clipboard
//! - tagged content, `[color=X]..[/color]` and `[url=..]..[/url]`, used by the
//!   info box
//!
//! Parsing produces a flat list of [`Segment`]s. Rendering to HTML escapes
//! all text, so the source string never reaches `innerHTML` unescaped.

use regex::Regex;
use std::sync::OnceLock;

/// One run of rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Link { url: String, label: String },
    /// Coloured text; `None` renders with the caller's default colour.
    Colored { color: Option<String>, text: String },
}

impl Segment {
    fn visible_text(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::Link { label, .. } => label,
            Segment::Colored { text, .. } => text,
        }
    }
}

/// Parsed markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    pub segments: Vec<Segment>,
}

/// Parsed copy markup together with the text a click should copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyMarkup {
    pub markup: Markup,
    pub copy_payload: String,
}

fn copy_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\[COPY_URL\](https?://[^\s]+)\[/COPY_URL\]|\[COPY_CUSTOM(?:=(#[0-9A-Fa-f]{6}|[a-zA-Z]+))?\](.+?)\[/COPY_CUSTOM\]",
        )
        .expect("copy markup regex is valid")
    })
}

fn tagged_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[color=([^\]]*?)\](.*?)\[/color\]|\[url=([^\]]*?)\](.*?)\[/url\]")
            .expect("tagged content regex is valid")
    })
}

fn valid_color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^#[0-9A-Fa-f]{6}$|^rgb\(\d{1,3},\s*\d{1,3},\s*\d{1,3}\)$|^[a-zA-Z]+$")
            .expect("colour regex is valid")
    })
}

fn valid_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^https?://[^\s<>"']+$"#).expect("url regex is valid")
    })
}

/// Whether `color` is a `#rrggbb`, `rgb(r, g, b)` or named colour.
pub fn is_valid_color(color: &str) -> bool {
    valid_color_regex().is_match(color)
}

/// Whether `url` is a plain http(s) URL safe to put in an `href`.
pub fn is_valid_url(url: &str) -> bool {
    valid_url_regex().is_match(url)
}

/// Escape text for use inside HTML element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

impl Markup {
    /// Plain text, no markup at all.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Text(text.into())],
        }
    }

    /// Parse `[color=..]` / `[url=..]` tagged content.
    ///
    /// Tags with an invalid colour or a non-http(s) URL degrade to their inner
    /// text.
    pub fn parse_tagged(content: &str) -> Self {
        let mut markup = Markup::default();
        let mut last = 0;
        for caps in tagged_regex().captures_iter(content) {
            let Some(whole) = caps.get(0) else { continue };
            markup.push_text(&content[last..whole.start()]);
            last = whole.end();

            if let (Some(color), Some(text)) = (caps.get(1), caps.get(2)) {
                if is_valid_color(color.as_str()) {
                    markup.segments.push(Segment::Colored {
                        color: Some(color.as_str().to_string()),
                        text: text.as_str().to_string(),
                    });
                } else {
                    markup.push_text(text.as_str());
                }
            } else if let (Some(url), Some(label)) = (caps.get(3), caps.get(4)) {
                if is_valid_url(url.as_str()) {
                    markup.segments.push(Segment::Link {
                        url: url.as_str().to_string(),
                        label: label.as_str().to_string(),
                    });
                } else {
                    markup.push_text(label.as_str());
                }
            }
        }
        markup.push_text(&content[last..]);
        markup
    }

    /// Plain text with tags stripped.
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(Segment::visible_text).collect()
    }

    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Link { url, .. } => Some(url.as_str()),
            _ => None,
        })
    }

    /// Render as escaped HTML. `default_color` is used for coloured segments
    /// that carry no colour of their own.
    pub fn to_html(&self, default_color: &str) -> String {
        let mut html = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => html.push_str(&escape_html(text)),
                Segment::Link { url, label } => {
                    html.push_str(&format!(
                        "<a href=\"{}\" target=\"_blank\" rel=\"noopener\" class=\"cg-link\">{}</a>",
                        escape_html(url),
                        escape_html(label)
                    ));
                }
                Segment::Colored { color, text } => {
                    let color = color.as_deref().unwrap_or(default_color);
                    html.push_str(&format!(
                        "<span style=\"color: {}\">{}</span>",
                        escape_html(color),
                        escape_html(text)
                    ));
                }
            }
        }
        html
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text(prev)) = self.segments.last_mut() {
            prev.push_str(text);
        } else {
            self.segments.push(Segment::Text(text.to_string()));
        }
    }
}

impl CopyMarkup {
    /// Parse copy markup out of an overlay message.
    ///
    /// The copy payload is the last `[COPY_URL]` target if any, else the text
    /// of the last `[COPY_CUSTOM]` tag, else the raw message.
    pub fn parse(message: &str) -> Self {
        let mut markup = Markup::default();
        let mut last_url: Option<String> = None;
        let mut last_custom: Option<String> = None;
        let mut last = 0;

        for caps in copy_regex().captures_iter(message) {
            let Some(whole) = caps.get(0) else { continue };
            markup.push_text(&message[last..whole.start()]);
            last = whole.end();

            if let Some(url) = caps.get(1) {
                let url = url.as_str().to_string();
                markup.segments.push(Segment::Link {
                    url: url.clone(),
                    label: url.clone(),
                });
                last_url = Some(url);
            } else if let Some(text) = caps.get(3) {
                let text = text.as_str().to_string();
                markup.segments.push(Segment::Colored {
                    color: caps.get(2).map(|c| c.as_str().to_string()),
                    text: text.clone(),
                });
                last_custom = Some(text);
            }
        }
        markup.push_text(&message[last..]);

        let copy_payload = last_url
            .or(last_custom)
            .unwrap_or_else(|| message.to_string());
        Self {
            markup,
            copy_payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_markup_url_wins() {
        let parsed = CopyMarkup::parse(
            "see [COPY_CUSTOM=red]abc[/COPY_CUSTOM] and [COPY_URL]https://a.example/x[/COPY_URL]",
        );
        assert_eq!(parsed.copy_payload, "https://a.example/x");
        assert_eq!(parsed.markup.links().collect::<Vec<_>>(), vec!["https://a.example/x"]);
    }

    #[test]
    fn test_copy_markup_last_url() {
        let parsed = CopyMarkup::parse(
            "[COPY_URL]https://one.example[/COPY_URL] [COPY_URL]https://two.example[/COPY_URL]",
        );
        assert_eq!(parsed.copy_payload, "https://two.example");
    }

    #[test]
    fn test_copy_markup_custom_and_raw() {
        let parsed = CopyMarkup::parse("[COPY_CUSTOM]first[/COPY_CUSTOM] [COPY_CUSTOM=#00ff00]second[/COPY_CUSTOM]");
        assert_eq!(parsed.copy_payload, "second");
        assert_eq!(
            parsed.markup.segments[0],
            Segment::Colored {
                color: None,
                text: "first".into()
            }
        );

        let raw = CopyMarkup::parse("plain failure");
        assert_eq!(raw.copy_payload, "plain failure");
        assert_eq!(raw.markup, Markup::plain("plain failure"));
    }

    #[test]
    fn test_copy_markup_rejects_non_http() {
        let parsed = CopyMarkup::parse("[COPY_URL]ftp://x[/COPY_URL]");
        assert_eq!(parsed.copy_payload, "[COPY_URL]ftp://x[/COPY_URL]");
        assert_eq!(parsed.markup.links().count(), 0);
    }

    #[test]
    fn test_parse_tagged_content() {
        let markup = Markup::parse_tagged(
            "a [color=#ff0000]red[/color] b [url=https://x.example]link[/url] [color=bad value]c[/color]",
        );
        assert_eq!(markup.plain_text(), "a red b link c");
        assert!(matches!(&markup.segments[1], Segment::Colored { color: Some(c), .. } if c == "#ff0000"));
        assert_eq!(markup.links().collect::<Vec<_>>(), vec!["https://x.example"]);
    }

    #[test]
    fn test_parse_tagged_rejects_javascript_url() {
        let markup = Markup::parse_tagged("[url=javascript:alert(1)]x[/url]");
        assert_eq!(markup, Markup::plain("x"));
    }

    #[test]
    fn test_valid_colors() {
        assert!(is_valid_color("#A0b1C2"));
        assert!(is_valid_color("rgb(1, 22,255)"));
        assert!(is_valid_color("teal"));
        assert!(!is_valid_color("#fff"));
        assert!(!is_valid_color("red;background:x"));
    }

    #[test]
    fn test_to_html_escapes() {
        let markup = Markup::parse_tagged("<b>x</b> [color=blue]<i>[/color]");
        assert_eq!(
            markup.to_html("#000000"),
            "&lt;b&gt;x&lt;/b&gt; <span style=\"color: blue\">&lt;i&gt;</span>"
        );

        let copy = CopyMarkup::parse("[COPY_CUSTOM]t[/COPY_CUSTOM]");
        assert_eq!(
            copy.markup.to_html("#ffffff"),
            "<span style=\"color: #ffffff\">t</span>"
        );
    }
}
