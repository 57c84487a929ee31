//! Notification delivery infrastructure.
//!
//! - [`dispatch`] -- durable audience broadcasts (notification + receipts +
//!   best-effort push), shared by the HTTP endpoint and the admin WebSocket
//!   message.
//! - [`router`] -- turns complaint lifecycle events from the event bus into
//!   live-only WebSocket pushes.

pub mod dispatch;
pub mod router;

pub use router::NotificationRouter;
