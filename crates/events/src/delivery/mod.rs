//! Outbound delivery channels for events that must leave the process.

pub mod email;
