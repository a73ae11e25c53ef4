//! Push-update channel: wire protocol and the reconnecting client.

mod client;
mod error;
mod protocol;

pub use client::{ChannelClient, ChannelEvent, ConnectionId, ConnectionState, Transport};
pub use error::{ChannelError, ProtocolError};
pub use protocol::{FinalImage, Inbound, Outbound, parse_inbound};
