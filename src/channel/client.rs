//! Reconnecting push channel client.
//!
//! The client owns at most one live connection. Each connection attempt gets
//! a fresh [`ConnectionId`]; transport callbacks carrying any other id belong
//! to a superseded connection and are ignored.

use std::rc::Rc;
use std::time::Duration;

use super::error::ChannelError;
use super::protocol::{FinalImage, Inbound, Outbound, parse_inbound};
use crate::config::ChannelConfig;
use crate::scheduler::{Scheduler, Timer, TimerId};

/// Identity of one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never opened, or gave up after the retry cap
    Closed,
    /// An attempt is in flight or scheduled; carries the retry count
    Connecting(u32),
    Open,
    ManuallyClosed,
}

/// Socket abstraction the client drives.
///
/// Implementations report back through [`ChannelClient::handle_open`],
/// [`ChannelClient::handle_message`] and [`ChannelClient::handle_close`] with
/// the id they were given.
pub trait Transport {
    /// Start connecting. An error means the connection object could not be
    /// created at all.
    fn connect(&mut self, url: &str, id: ConnectionId) -> Result<(), ChannelError>;
    fn send(&mut self, id: ConnectionId, text: &str) -> Result<(), ChannelError>;
    fn close(&mut self, id: ConnectionId);
}

/// Typed event produced by an inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Preview(String),
    Final(FinalImage),
}

/// Push channel client with bounded fixed-interval retry
pub struct ChannelClient {
    url: String,
    transport: Box<dyn Transport>,
    scheduler: Rc<dyn Scheduler>,
    state: ConnectionState,
    current: Option<ConnectionId>,
    next_id: u64,
    retry_count: u32,
    retry_timer: Option<TimerId>,
    retry_interval: Duration,
    max_retries: u32,
    manually_closed: bool,
    pending_preview: Option<String>,
}

impl ChannelClient {
    pub fn new(
        config: &ChannelConfig,
        transport: Box<dyn Transport>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self {
            url: config.url(),
            transport,
            scheduler,
            state: ConnectionState::Closed,
            current: None,
            next_id: 0,
            retry_count: 0,
            retry_timer: None,
            retry_interval: Duration::from_millis(config.retry_interval_ms),
            max_retries: config.max_retries,
            manually_closed: false,
            pending_preview: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn current(&self) -> Option<ConnectionId> {
        self.current
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Last preview received since the most recent final image.
    pub fn pending_preview(&self) -> Option<&str> {
        self.pending_preview.as_deref()
    }

    /// The loading overlay could not display the pending preview.
    pub fn clear_pending_preview(&mut self) {
        self.pending_preview = None;
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open the channel, starting a fresh attempt sequence.
    ///
    /// Returns the existing id when already open, the new id otherwise, or
    /// `None` when the connection object could not be created (a retry is
    /// then scheduled).
    pub fn open(&mut self) -> Option<ConnectionId> {
        if self.state == ConnectionState::Open {
            log::debug!("[channel] already connected");
            return self.current;
        }
        self.manually_closed = false;
        self.retry_count = 0;
        self.cancel_retry();
        self.connect_attempt()
    }

    /// Close the channel and stop retrying.
    pub fn close(&mut self) {
        self.manually_closed = true;
        self.cancel_retry();
        if let Some(id) = self.current.take() {
            self.transport.close(id);
        }
        self.pending_preview = None;
        self.state = ConnectionState::ManuallyClosed;
        log::info!("[channel] closed");
    }

    fn connect_attempt(&mut self) -> Option<ConnectionId> {
        if let Some(previous) = self.current.take() {
            log::debug!("[channel] superseding connection {:?}", previous);
            self.transport.close(previous);
        }

        self.next_id += 1;
        let id = ConnectionId(self.next_id);
        self.current = Some(id);
        self.state = ConnectionState::Connecting(self.retry_count);

        match self.transport.connect(&self.url, id) {
            Ok(()) => Some(id),
            Err(e) => {
                log::warn!("[channel] failed to initialize: {}", e);
                self.current = None;
                self.schedule_retry();
                None
            }
        }
    }

    fn schedule_retry(&mut self) {
        if self.manually_closed {
            self.state = ConnectionState::ManuallyClosed;
            return;
        }
        if self.retry_count < self.max_retries {
            log::warn!(
                "[channel] connection attempt {} failed, retrying in {}ms...",
                self.retry_count + 1,
                self.retry_interval.as_millis()
            );
            self.retry_count += 1;
            self.state = ConnectionState::Connecting(self.retry_count);
            self.retry_timer = Some(self.scheduler.schedule(self.retry_interval, Timer::Reconnect));
        } else {
            log::error!("[channel] max retry attempts reached, giving up");
            self.state = ConnectionState::Closed;
        }
    }

    fn cancel_retry(&mut self) {
        if let Some(timer) = self.retry_timer.take() {
            self.scheduler.cancel(timer);
        }
    }

    /// The reconnect timer fired.
    pub fn handle_retry_timer(&mut self) {
        if self.retry_timer.take().is_none() || self.manually_closed {
            return;
        }
        self.connect_attempt();
    }

    // =========================================================================
    // Transport callbacks
    // =========================================================================

    fn is_current(&self, id: ConnectionId) -> bool {
        self.current == Some(id)
    }

    pub fn handle_open(&mut self, id: ConnectionId) {
        if !self.is_current(id) {
            log::debug!("[channel] ignoring open of stale connection {:?}", id);
            return;
        }
        log::info!("[channel] connected to {}", self.url);
        self.state = ConnectionState::Open;
        self.retry_count = 0;
        self.cancel_retry();
    }

    pub fn handle_close(&mut self, id: ConnectionId) {
        if !self.is_current(id) {
            log::debug!("[channel] ignoring close of stale connection {:?}", id);
            return;
        }
        self.current = None;
        if self.manually_closed {
            self.state = ConnectionState::ManuallyClosed;
            return;
        }
        self.schedule_retry();
    }

    pub fn handle_error(&mut self, id: ConnectionId, message: &str) {
        if self.is_current(id) {
            log::warn!("[channel] error: {}", message);
        }
    }

    /// Decode a text frame. A final image is acknowledged before it is
    /// returned.
    pub fn handle_message(&mut self, id: ConnectionId, text: &str) -> Option<ChannelEvent> {
        if !self.is_current(id) {
            return None;
        }

        match parse_inbound(text) {
            Ok(Inbound::Preview { data_uri }) => {
                self.pending_preview = Some(data_uri.clone());
                Some(ChannelEvent::Preview(data_uri))
            }
            Ok(Inbound::Final(image)) => {
                self.acknowledge(id, &image.seed);
                self.pending_preview = None;
                Some(ChannelEvent::Final(image))
            }
            Err(e) => {
                if e.is_preview() {
                    self.pending_preview = None;
                }
                log::warn!("[channel] dropping frame: {}", e);
                None
            }
        }
    }

    fn acknowledge(&mut self, id: ConnectionId, seed: &str) {
        let ack = Outbound::FinalImageAck {
            seed: seed.to_string(),
        };
        let result = ack
            .to_json()
            .map_err(|e| ChannelError::Send(e.to_string()))
            .and_then(|json| self.transport.send(id, &json));
        if let Err(e) = result {
            log::warn!("[channel] failed to acknowledge seed {}: {}", seed, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Log {
        connects: Vec<ConnectionId>,
        closes: Vec<ConnectionId>,
        sent: Vec<String>,
        fail_connect: bool,
    }

    struct FakeTransport(Rc<RefCell<Log>>);

    impl Transport for FakeTransport {
        fn connect(&mut self, url: &str, id: ConnectionId) -> Result<(), ChannelError> {
            let mut log = self.0.borrow_mut();
            if log.fail_connect {
                return Err(ChannelError::Connect {
                    url: url.to_string(),
                    reason: "refused".to_string(),
                });
            }
            log.connects.push(id);
            Ok(())
        }

        fn send(&mut self, _id: ConnectionId, text: &str) -> Result<(), ChannelError> {
            self.0.borrow_mut().sent.push(text.to_string());
            Ok(())
        }

        fn close(&mut self, id: ConnectionId) {
            self.0.borrow_mut().closes.push(id);
        }
    }

    fn client() -> (ChannelClient, Rc<RefCell<Log>>, Rc<ManualScheduler>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let scheduler = Rc::new(ManualScheduler::new());
        let client = ChannelClient::new(
            &ChannelConfig::default(),
            Box::new(FakeTransport(log.clone())),
            scheduler.clone(),
        );
        (client, log, scheduler)
    }

    #[test]
    fn test_open_is_idempotent_when_open() {
        let (mut client, log, _) = client();
        let id = client.open().unwrap();
        client.handle_open(id);
        assert_eq!(client.state(), ConnectionState::Open);
        assert_eq!(client.open(), Some(id));
        assert_eq!(log.borrow().connects.len(), 1);
    }

    #[test]
    fn test_open_supersedes_pending_connection() {
        let (mut client, log, _) = client();
        let first = client.open().unwrap();
        let second = client.open().unwrap();
        assert_ne!(first, second);
        assert_eq!(log.borrow().closes, vec![first]);

        // Late callbacks from the superseded socket are ignored
        client.handle_open(first);
        assert_eq!(client.state(), ConnectionState::Connecting(0));
        client.handle_close(first);
        assert_eq!(client.current(), Some(second));
    }

    #[test]
    fn test_retry_cap() {
        let (mut client, _, scheduler) = client();
        let mut id = client.open().unwrap();
        for attempt in 1..=10 {
            client.handle_close(id);
            assert_eq!(client.state(), ConnectionState::Connecting(attempt));
            let (_, delay, timer) = scheduler.pop().unwrap();
            assert_eq!(delay, Duration::from_millis(500));
            assert_eq!(timer, Timer::Reconnect);
            client.handle_retry_timer();
            id = client.current().unwrap();
        }
        client.handle_close(id);
        assert_eq!(client.state(), ConnectionState::Closed);
        assert_eq!(scheduler.pending_count(), 0);

        // A fresh open starts a new sequence
        let id = client.open().unwrap();
        assert_eq!(client.retry_count(), 0);
        client.handle_close(id);
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn test_construction_failure_retries() {
        let (mut client, log, scheduler) = client();
        log.borrow_mut().fail_connect = true;
        assert_eq!(client.open(), None);
        assert_eq!(client.state(), ConnectionState::Connecting(1));
        assert_eq!(scheduler.pending_count(), 1);

        log.borrow_mut().fail_connect = false;
        scheduler.pop();
        client.handle_retry_timer();
        let id = client.current().unwrap();
        client.handle_open(id);
        assert_eq!(client.retry_count(), 0);
    }

    #[test]
    fn test_manual_close_stops_retry() {
        let (mut client, log, scheduler) = client();
        let id = client.open().unwrap();
        client.handle_close(id);
        assert_eq!(scheduler.pending_count(), 1);

        client.close();
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(client.state(), ConnectionState::ManuallyClosed);

        // A timer that slipped through does nothing
        client.handle_retry_timer();
        assert_eq!(log.borrow().connects.len(), 1);
    }

    #[test]
    fn test_messages() {
        let (mut client, log, _) = client();
        let id = client.open().unwrap();
        client.handle_open(id);

        let event = client.handle_message(
            id,
            r#"{"command":"preview_image","base64":"data:image/png;base64,P"}"#,
        );
        assert_eq!(event, Some(ChannelEvent::Preview("data:image/png;base64,P".into())));
        assert_eq!(client.pending_preview(), Some("data:image/png;base64,P"));

        let event = client.handle_message(
            id,
            r#"{"command":"final_image","base64":"data:image/png;base64,F","seed":"7","tags":"a","keep_gallery":"True"}"#,
        );
        assert!(matches!(event, Some(ChannelEvent::Final(ref image)) if image.seed == "7"));
        assert_eq!(client.pending_preview(), None);
        assert_eq!(
            log.borrow().sent,
            vec![r#"{"command":"final_image_ack","seed":"7"}"#.to_string()]
        );
    }

    #[test]
    fn test_malformed_preview_clears_pending() {
        let (mut client, _, _) = client();
        let id = client.open().unwrap();
        client.handle_message(
            id,
            r#"{"command":"preview_image","base64":"data:image/png;base64,P"}"#,
        );
        assert!(client.pending_preview().is_some());
        assert_eq!(
            client.handle_message(id, r#"{"command":"preview_image","base64":"oops"}"#),
            None
        );
        assert_eq!(client.pending_preview(), None);
        assert_eq!(client.handle_message(id, r#"{"command":"nope"}"#), None);
    }

    #[test]
    fn test_non_string_preview_clears_pending() {
        let (mut client, _, _) = client();
        let id = client.open().unwrap();
        client.handle_message(
            id,
            r#"{"command":"preview_image","base64":"data:image/png;base64,P"}"#,
        );
        assert_eq!(
            client.handle_message(id, r#"{"command":"preview_image","base64":5}"#),
            None
        );
        assert_eq!(client.pending_preview(), None);
    }

    #[test]
    fn test_stale_message_ignored() {
        let (mut client, _, _) = client();
        let first = client.open().unwrap();
        client.open();
        let frame = r#"{"command":"preview_image","base64":"data:image/png;base64,P"}"#;
        assert_eq!(client.handle_message(first, frame), None);
    }
}
