//! Transport between ClipSync views and the session core.
//!
//! Provides:
//! - Wire protocol (tagged JSON commands in, state snapshots out)
//! - Command dispatch onto an `App`
//! - WebSocket transport (feature: websocket)

pub mod handler;
pub mod protocol;

#[cfg(feature = "websocket")]
pub mod websocket;

pub use handler::handle_client_message;
pub use protocol::{ClientMessage, ServerMessage};
