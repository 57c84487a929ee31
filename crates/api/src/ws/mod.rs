//! WebSocket infrastructure for live notification delivery.
//!
//! Provides the connection registry, heartbeat monitoring, and the HTTP
//! upgrade handler used by Axum routes. Clients register with a JWT (or the
//! admin key) after connecting; the handler module defines the wire protocol.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
