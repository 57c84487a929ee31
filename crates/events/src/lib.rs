//! Waterline event bus and outbound delivery infrastructure.
//!
//! This crate provides the building blocks that decouple complaint
//! lifecycle changes from the components that react to them:
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`]: the canonical event envelope.
//! - [`kinds`]: the event-type vocabulary.
//! - [`delivery`]: external delivery channels (email).

pub mod bus;
pub mod delivery;
pub mod kinds;

pub use bus::{DomainEvent, EventBus};
pub use delivery::email::{EmailConfig, EmailDelivery};
