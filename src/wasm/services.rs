//! Browser implementations of the host services: timers, the push channel
//! socket, the completion service and the clipboard.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use cg_ui::{SuggestionItem, SuggestionRequest};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{CloseEvent, Event, Headers, MessageEvent, Request, RequestInit, Response, WebSocket};

use super::with_frontend;
use crate::channel::{ChannelError, ConnectionId, Transport};
use crate::scheduler::{Scheduler, Timer, TimerId};
use crate::suggest::{self, SuggestError, SuggestionService};
use crate::surface::Clipboard;

// =============================================================================
// Timers
// =============================================================================

/// `setTimeout` backed scheduler. Fired timers are routed to
/// [`crate::app::Frontend::on_timer`].
#[derive(Default)]
pub struct DomScheduler {
    next_id: Cell<u64>,
    handles: Rc<RefCell<HashMap<u64, i32>>>,
}

impl DomScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for DomScheduler {
    fn schedule(&self, delay: Duration, timer: Timer) -> TimerId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);

        let handles = self.handles.clone();
        let callback = Closure::once_into_js(move || {
            handles.borrow_mut().remove(&id);
            with_frontend(|frontend| frontend.on_timer(timer));
        });

        let Some(window) = web_sys::window() else {
            log::error!("[timer] no window to schedule on");
            return TimerId(id);
        };
        let millis = delay.as_millis().min(i32::MAX as u128) as i32;
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            millis,
        ) {
            Ok(handle) => {
                self.handles.borrow_mut().insert(id, handle);
            }
            Err(e) => log::error!("[timer] setTimeout failed: {:?}", e),
        }
        TimerId(id)
    }

    fn cancel(&self, id: TimerId) {
        let Some(handle) = self.handles.borrow_mut().remove(&id.0) else {
            return;
        };
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(handle);
        }
    }
}

// =============================================================================
// Push channel
// =============================================================================

/// Event handlers of one socket. Dropping them detaches the callbacks.
struct WsHandlers {
    _onopen: Closure<dyn FnMut(Event)>,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onerror: Closure<dyn FnMut(Event)>,
    _onclose: Closure<dyn FnMut(CloseEvent)>,
}

struct OpenSocket {
    id: ConnectionId,
    ws: WebSocket,
    _handlers: WsHandlers,
}

/// `WebSocket` transport. Holds at most one socket; callbacks are tagged
/// with the connection id they were created for.
#[derive(Default)]
pub struct WebSocketTransport {
    socket: Option<OpenSocket>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn drop_socket(&mut self) {
        let Some(socket) = self.socket.take() else {
            return;
        };
        socket.ws.set_onopen(None);
        socket.ws.set_onmessage(None);
        socket.ws.set_onerror(None);
        socket.ws.set_onclose(None);
        if let Err(e) = socket.ws.close() {
            log::debug!("[channel] close of {:?} failed: {:?}", socket.id, e);
        }
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, url: &str, id: ConnectionId) -> Result<(), ChannelError> {
        self.drop_socket();

        let ws = WebSocket::new(url).map_err(|e| ChannelError::Connect {
            url: url.to_string(),
            reason: format!("{:?}", e),
        })?;

        let onopen = Closure::wrap(Box::new(move |_: Event| {
            with_frontend(|frontend| frontend.on_channel_open(id));
        }) as Box<dyn FnMut(Event)>);
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));

        let onmessage = Closure::wrap(Box::new(move |event: MessageEvent| {
            match event.data().as_string() {
                Some(text) => with_frontend(|frontend| frontend.on_channel_message(id, &text)),
                None => log::warn!("[channel] ignoring non-text frame"),
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

        let onerror = Closure::wrap(Box::new(move |event: Event| {
            let message = format!("socket error ({})", event.type_());
            with_frontend(|frontend| frontend.on_channel_error(id, &message));
        }) as Box<dyn FnMut(Event)>);
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        let onclose = Closure::wrap(Box::new(move |event: CloseEvent| {
            log::debug!("[channel] closed with code {}", event.code());
            with_frontend(|frontend| frontend.on_channel_close(id));
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        self.socket = Some(OpenSocket {
            id,
            ws,
            _handlers: WsHandlers {
                _onopen: onopen,
                _onmessage: onmessage,
                _onerror: onerror,
                _onclose: onclose,
            },
        });
        Ok(())
    }

    fn send(&mut self, id: ConnectionId, text: &str) -> Result<(), ChannelError> {
        match &self.socket {
            Some(socket) if socket.id == id => socket
                .ws
                .send_with_str(text)
                .map_err(|e| ChannelError::Send(format!("{:?}", e))),
            _ => Err(ChannelError::Closed),
        }
    }

    fn close(&mut self, id: ConnectionId) {
        if self.socket.as_ref().is_some_and(|socket| socket.id == id) {
            self.drop_socket();
        }
    }
}

// =============================================================================
// Completion service
// =============================================================================

/// Runs the two-step completion lookup with `fetch`.
pub struct FetchSuggestions {
    base_url: String,
}

impl FetchSuggestions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

fn js_error(e: JsValue) -> SuggestError {
    SuggestError::Network(format!("{:?}", e))
}

async fn fetch_text(
    url: &str,
    body: Option<&str>,
    stage: &'static str,
) -> Result<String, SuggestError> {
    let window = web_sys::window().ok_or_else(|| SuggestError::Network("no window".into()))?;

    let init = RequestInit::new();
    match body {
        Some(body) => {
            init.set_method("POST");
            init.set_body(&JsValue::from_str(body));
            let headers = Headers::new().map_err(js_error)?;
            headers
                .set("Content-Type", "application/json")
                .map_err(js_error)?;
            init.set_headers(&headers);
        }
        None => init.set_method("GET"),
    }

    let request = Request::new_with_str_and_init(url, &init).map_err(js_error)?;
    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?;
    let response: Response = response.dyn_into().map_err(js_error)?;
    if !response.ok() {
        return Err(SuggestError::Http {
            stage,
            status: response.status(),
        });
    }

    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    text.as_string()
        .ok_or_else(|| SuggestError::Network(format!("{} body is not text", stage)))
}

async fn lookup(base_url: &str, word: &str) -> Result<Vec<SuggestionItem>, SuggestError> {
    let body = suggest::request_body(word)?;
    let queued = fetch_text(&suggest::call_url(base_url), Some(&body), "queue").await?;
    let event_id = suggest::parse_event_id(&queued)?;
    let stream = fetch_text(&suggest::result_url(base_url, &event_id), None, "result").await?;
    suggest::parse_candidates(&stream)
}

impl SuggestionService for FetchSuggestions {
    fn request(&self, input: &str, request: SuggestionRequest) {
        let base_url = self.base_url.clone();
        let input = input.to_string();
        spawn_local(async move {
            let result = lookup(&base_url, &request.word).await;
            with_frontend(|frontend| frontend.on_suggestions(&input, request.generation, result));
        });
    }
}

// =============================================================================
// Clipboard
// =============================================================================

/// `navigator.clipboard` writer.
pub struct NavigatorClipboard;

impl Clipboard for NavigatorClipboard {
    fn write_text(&self, text: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let promise = window.navigator().clipboard().write_text(text);
        spawn_local(async move {
            match JsFuture::from(promise).await {
                Ok(_) => log::debug!("[clipboard] copied"),
                Err(e) => log::warn!("[clipboard] copy failed: {:?}", e),
            }
        });
    }
}
