//! Event-to-push routing engine.
//!
//! [`NotificationRouter`] subscribes to the event bus and turns each
//! complaint lifecycle event into live WebSocket pushes: an `event` frame
//! to the affected resident/technician and an `admin_event` frame to the
//! admin set. These pushes are volatile; durable notification rows are only
//! created by the admin broadcast path.

use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::broadcast;
use waterline_core::types::DbId;
use waterline_events::{kinds, DomainEvent};

use crate::ws::WsManager;

/// Routes complaint lifecycle events to connected clients.
pub struct NotificationRouter {
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    /// Create a new router delivering through the given WebSocket registry.
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](waterline_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver a single event to every connection it concerns.
    ///
    /// Affected users come from the event payload: publishers embed
    /// `resident_id` and `technician_user_id` precisely so routing needs no
    /// database round-trip.
    async fn route_event(&self, event: &DomainEvent) {
        let resident = payload_id(event, "resident_id");
        let technician = payload_id(event, "technician_user_id");

        let user_targets: Vec<DbId> = match event.event_type.as_str() {
            // A fresh complaint concerns only the back office.
            kinds::COMPLAINT_CREATED => vec![],
            kinds::COMPLAINT_ASSIGNED => [technician, resident].into_iter().flatten().collect(),
            kinds::COMPLAINT_STATUS_CHANGED => {
                [resident, technician].into_iter().flatten().collect()
            }
            kinds::COMPLAINT_DELETED => vec![],
            other => {
                tracing::debug!(event_type = other, "No routing rule for event");
                return;
            }
        };

        let user_frame = frame("event", event);
        for user_id in user_targets {
            self.ws_manager
                .send_to_user(user_id, user_frame.clone())
                .await;
        }

        let admin_count = self
            .ws_manager
            .notify_admins(frame("admin_event", event))
            .await;
        tracing::debug!(
            event_type = %event.event_type,
            complaint_id = event.complaint_id,
            admin_count,
            "Routed lifecycle event"
        );
    }
}

fn payload_id(event: &DomainEvent, key: &str) -> Option<DbId> {
    event.payload.get(key).and_then(|v| v.as_i64())
}

fn frame(frame_type: &str, event: &DomainEvent) -> Message {
    let body = serde_json::json!({
        "type": frame_type,
        "event": event.event_type,
        "complaint_id": event.complaint_id,
        "payload": event.payload,
        "timestamp": event.timestamp,
    });
    Message::Text(body.to_string().into())
}
