//! Native push-channel monitor.
//!
//! Runs the same [`Frontend`] as the browser build against a blocking
//! `tungstenite` socket. Pushed images are acknowledged and collected in the
//! session gallery; every render is logged instead of drawn.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::net::TcpStream;
use std::rc::Rc;

use cg_ui::{FieldWrite, SuggestionRequest, TextEdit};
use thiserror::Error;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use crate::app::{Frontend, Services};
use crate::channel::{ChannelError, ConnectionId, ConnectionState, Transport};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::scheduler::{ManualScheduler, Scheduler};
use crate::storage::KeyValueStore;
use crate::suggest::SuggestionService;
use crate::surface::{
    Clipboard, CustomRender, DropdownRender, ErrorRender, FullscreenRender, GalleryRender,
    InfoBoxRender, LoadingRender, PanelRender, PrivacyBallRender, ScrollTarget, SuggestionRender,
    ThumbOverlayRender, ThumbsRender, UiSurface,
};

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

/// Why the monitor stopped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonitorError {
    #[error("gave up connecting to {url}")]
    GaveUp { url: String },
}

/// What the monitor collected before it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSummary {
    pub images: usize,
    pub sessions: u64,
}

/// Monitor options on top of the configuration.
#[derive(Debug, Clone, Default)]
pub struct MonitorOptions {
    /// Stop after this many final images
    pub max_images: Option<usize>,
}

// =============================================================================
// Transport
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SocketEvent {
    Open(ConnectionId),
}

#[derive(Default)]
struct SocketSlot {
    socket: Option<(ConnectionId, Socket)>,
    events: VecDeque<SocketEvent>,
}

/// Blocking socket shared between the transport and the monitor loop.
type SharedSocket = Rc<RefCell<SocketSlot>>;

/// [`Transport`] over a blocking `tungstenite` client socket.
pub struct TungsteniteTransport {
    slot: SharedSocket,
}

impl Transport for TungsteniteTransport {
    fn connect(&mut self, url: &str, id: ConnectionId) -> Result<(), ChannelError> {
        let (socket, response) = tungstenite::connect(url).map_err(|e| ChannelError::Connect {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        log::debug!("[monitor] handshake status {}", response.status());

        let mut slot = self.slot.borrow_mut();
        slot.socket = Some((id, socket));
        slot.events.push_back(SocketEvent::Open(id));
        Ok(())
    }

    fn send(&mut self, id: ConnectionId, text: &str) -> Result<(), ChannelError> {
        let mut slot = self.slot.borrow_mut();
        match slot.socket.as_mut() {
            Some((current, socket)) if *current == id => socket
                .send(Message::text(text.to_string()))
                .map_err(|e| ChannelError::Send(e.to_string())),
            _ => Err(ChannelError::Closed),
        }
    }

    fn close(&mut self, id: ConnectionId) {
        let mut slot = self.slot.borrow_mut();
        if slot.socket.as_ref().is_some_and(|(current, _)| *current == id) {
            if let Some((_, mut socket)) = slot.socket.take() {
                let _ = socket.close(None);
            }
        }
    }
}

// =============================================================================
// Logging host services
// =============================================================================

/// [`UiSurface`] that logs what would be drawn.
#[derive(Debug, Default)]
pub struct LogSurface {
    seed: Option<i64>,
}

impl UiSurface for LogSurface {
    fn render_gallery(&mut self, render: &GalleryRender) {
        log::info!(
            "[gallery] {:?} {} (+{} cells{})",
            render.mode,
            render.label,
            render.batch.cells.len(),
            if render.batch.replace { ", redraw" } else { "" }
        );
    }

    fn render_fullscreen(&mut self, render: Option<&FullscreenRender>) {
        log::debug!("[gallery] fullscreen {:?}", render.map(|r| r.index));
    }

    fn render_thumbs(&mut self, render: Option<&ThumbsRender>) {
        log::debug!("[thumbs] {:?}", render.map(|r| r.images.len()));
    }

    fn render_loading(&mut self, render: Option<&LoadingRender>) {
        if let Some(render) = render {
            log::debug!("[loading] {} {}", render.message, render.elapsed);
        }
    }

    fn render_error(&mut self, render: Option<&ErrorRender>) {
        if let Some(render) = render {
            log::error!("[overlay] {}", render.html);
        }
    }

    fn render_custom(&mut self, render: Option<&CustomRender>) {
        if let Some(render) = render {
            log::info!("[overlay] {}", render.html);
        }
    }

    fn render_panel(&mut self, _render: &PanelRender) {}

    fn render_privacy(&mut self, balls: &[PrivacyBallRender]) {
        log::debug!("[privacy] {} balls", balls.len());
    }

    fn render_thumb_overlay(&mut self, _render: Option<&ThumbOverlayRender>) {}

    fn render_scroll_drag(&mut self, _target: ScrollTarget, _scroll_left: Option<f32>) {}

    fn render_info_box(&mut self, render: &InfoBoxRender) {
        if !render.html.is_empty() {
            log::info!("[info] {}", render.html);
        }
    }

    fn render_suggestions(&mut self, _input: &str, _render: Option<&SuggestionRender>) {}

    fn render_dropdown(&mut self, _container: &str, _render: &DropdownRender) {}

    fn input_state(&self, _input: &str) -> Option<(String, usize)> {
        None
    }

    fn write_input(&mut self, _input: &str, _edit: &TextEdit) {}

    fn write_field(&mut self, _container: &str, _write: &FieldWrite) {}

    fn dropdown_changed(&mut self, _container: &str, _values: &[String]) {}

    fn hover_preview(&mut self, _container: &str, _key: Option<&str>) {}

    fn seed_input(&self) -> Option<i64> {
        self.seed
    }

    fn set_seed_input(&mut self, seed: i64) {
        self.seed = Some(seed);
    }

    fn gallery_width(&self) -> f32 {
        0.0
    }
}

/// The monitor has no prompt inputs to complete.
struct NoSuggestions;

impl SuggestionService for NoSuggestions {
    fn request(&self, input: &str, request: SuggestionRequest) {
        log::debug!("[suggest] ignoring lookup '{}' for {}", request.word, input);
    }
}

struct LogClipboard;

impl Clipboard for LogClipboard {
    fn write_text(&self, text: &str) {
        log::info!("[clipboard] {}", text);
    }
}

// =============================================================================
// Event loop
// =============================================================================

enum Step {
    Opened(ConnectionId),
    Frame(ConnectionId, String),
    Closed(ConnectionId),
}

fn next_step(slot: &SharedSocket) -> Option<Step> {
    let mut slot = slot.borrow_mut();
    if let Some(SocketEvent::Open(id)) = slot.events.pop_front() {
        return Some(Step::Opened(id));
    }
    let (id, socket) = slot.socket.as_mut()?;
    let id = *id;
    loop {
        match socket.read() {
            Ok(Message::Text(text)) => return Some(Step::Frame(id, text.as_str().to_string())),
            Ok(Message::Close(_)) => break,
            // Pings are answered by tungstenite itself
            Ok(other) => log::trace!("[monitor] ignoring {:?} frame", other),
            Err(e) => {
                log::warn!("[monitor] read failed: {}", e);
                break;
            }
        }
    }
    slot.socket = None;
    Some(Step::Closed(id))
}

/// Connect and run until the channel gives up or `max_images` arrived.
pub fn run(
    config: AppConfig,
    store: Rc<dyn KeyValueStore>,
    options: MonitorOptions,
) -> Result<MonitorSummary, MonitorError> {
    let url = config.channel.url();
    let scheduler = Rc::new(ManualScheduler::new());
    let slot = SharedSocket::default();

    let ctx = AppContext::new(
        config,
        store,
        scheduler.clone() as Rc<dyn Scheduler>,
        cg_ui::Size::new(1280.0, 800.0),
    );
    let services = Services {
        transport: Box::new(TungsteniteTransport { slot: slot.clone() }),
        suggestions: Box::new(NoSuggestions),
        surface: Box::new(LogSurface::default()),
        clipboard: Box::new(LogClipboard),
    };
    let mut frontend = Frontend::new(ctx, services);

    log::info!("[monitor] connecting to {}", url);
    frontend.open_channel();

    loop {
        if options
            .max_images
            .is_some_and(|max| frontend.gallery().len() >= max)
        {
            frontend.close_channel();
            break;
        }

        match next_step(&slot) {
            Some(Step::Opened(id)) => frontend.on_channel_open(id),
            Some(Step::Frame(id, text)) => frontend.on_channel_message(id, &text),
            Some(Step::Closed(id)) => frontend.on_channel_close(id),
            None => match scheduler.pop() {
                Some((_, delay, timer)) => {
                    std::thread::sleep(delay);
                    frontend.on_timer(timer);
                }
                None => break,
            },
        }
    }

    let summary = MonitorSummary {
        images: frontend.gallery().len(),
        sessions: frontend.gallery().session() + 1,
    };
    match frontend.channel().state() {
        ConnectionState::Closed if summary.images == 0 => Err(MonitorError::GaveUp { url }),
        _ => Ok(summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::net::TcpListener;
    use std::thread;

    fn config_for(port: u16, max_retries: u32) -> AppConfig {
        let mut config = AppConfig::new();
        config.channel.host = "127.0.0.1".to_string();
        config.channel.port = port;
        config.channel.max_retries = max_retries;
        config.channel.retry_interval_ms = 1;
        config
    }

    #[test]
    fn test_monitor_acknowledges_final_images() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut ws = tungstenite::accept(stream).unwrap();
            ws.send(Message::text(
                r#"{"command":"preview_image","base64":"data:image/png;base64,AA"}"#,
            ))
            .unwrap();
            ws.send(Message::text(
                r#"{"command":"final_image","base64":"data:image/png;base64,BB","seed":"7","tags":"a, b","keep_gallery":"True"}"#,
            ))
            .unwrap();
            loop {
                match ws.read().unwrap() {
                    Message::Text(text) => return text.as_str().to_string(),
                    _ => continue,
                }
            }
        });

        let summary = run(
            config_for(port, 0),
            Rc::new(MemoryStore::new()),
            MonitorOptions {
                max_images: Some(1),
            },
        )
        .unwrap();

        assert_eq!(summary.images, 1);
        assert_eq!(
            server.join().unwrap(),
            r#"{"command":"final_image_ack","seed":"7"}"#
        );
    }

    #[test]
    fn test_monitor_gives_up_without_server() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let result = run(
            config_for(port, 2),
            Rc::new(MemoryStore::new()),
            MonitorOptions::default(),
        );
        assert!(matches!(result, Err(MonitorError::GaveUp { .. })));
    }
}
