//! Channel and protocol errors.

use thiserror::Error;

/// Transport-level failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("failed to send frame: {0}")]
    Send(String),

    #[error("connection is closed")]
    Closed,
}

/// Reasons an inbound frame is dropped.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("missing or non-string command")]
    MissingCommand,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("{command}: missing field '{field}'")]
    MissingField {
        command: &'static str,
        field: &'static str,
    },

    #[error("{0}: payload is not a data:image URI")]
    InvalidImageData(&'static str),
}

impl ProtocolError {
    /// Whether the frame was a `preview_image` with an unusable payload.
    pub fn is_preview(&self) -> bool {
        matches!(
            self,
            ProtocolError::InvalidImageData("preview_image")
                | ProtocolError::MissingField {
                    command: "preview_image",
                    ..
                }
        )
    }
}
