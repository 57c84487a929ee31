use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use waterline_core::roles::ROLE_ADMIN;
use waterline_core::types::DbId;
use waterline_db::models::notification::CreateNotification;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::notifications::dispatch;
use crate::state::AppState;
use crate::ws::manager::WsManager;

/// How long a fresh connection has to send its `register` message.
const REGISTER_WINDOW_SECS: u64 = 10;

/// Messages clients may send over the socket.
#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    /// `{"type":"register","token":"<jwt>"}` or
    /// `{"type":"register","admin_key":"<key>"}`. Must be the first message.
    Register {
        token: Option<String>,
        admin_key: Option<String>,
    },
    /// Admin-only broadcast, same path as `POST /api/v1/notifications`.
    SendNotification {
        title: String,
        body: String,
        audience: String,
        user_ids: Option<Vec<DbId>>,
    },
}

/// Who a connection registered as.
enum Identity {
    User { user_id: DbId, is_admin: bool },
    AdminKey,
}

impl Identity {
    fn can_broadcast(&self) -> bool {
        matches!(
            self,
            Identity::AdminKey | Identity::User { is_admin: true, .. }
        )
    }

    fn author_id(&self) -> Option<DbId> {
        match self {
            Identity::User { user_id, .. } => Some(*user_id),
            Identity::AdminKey => None,
        }
    }
}

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is added to `WsManager` and managed by
/// two tasks (sender + receiver). Pushes only start flowing once the client
/// registers.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Adds the connection to `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Waits for a `register` message; a connection that sends anything
///      else first, fails the credential check, or stays silent past the
///      window is closed.
///   4. Processes further inbound messages on the current task.
///   5. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let ws_manager = state.ws_manager.clone();
    let mut rx = ws_manager.add(conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    let mut identity: Option<Identity> = None;

    // Receiver loop: process inbound messages.
    loop {
        let next = if identity.is_none() {
            match tokio::time::timeout(
                Duration::from_secs(REGISTER_WINDOW_SECS),
                stream.next(),
            )
            .await
            {
                Ok(item) => item,
                Err(_) => {
                    tracing::debug!(conn_id = %conn_id, "Register window elapsed");
                    send_error(&ws_manager, &conn_id, "Registration timed out").await;
                    break;
                }
            }
        } else {
            stream.next().await
        };

        let Some(result) = next else { break };

        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Ping(_)) => {}
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => {
                    if !handle_client_message(&state, &conn_id, &mut identity, msg).await {
                        break;
                    }
                }
                Err(_) if identity.is_none() => {
                    send_error(&ws_manager, &conn_id, "Expected a register message").await;
                    break;
                }
                Err(_) => {
                    send_error(&ws_manager, &conn_id, "Unrecognized message").await;
                }
            },
            Ok(_) if identity.is_none() => {
                send_error(&ws_manager, &conn_id, "Expected a register message").await;
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection and abort sender task.
    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Handle one parsed client message. Returns `false` when the connection
/// should be closed.
async fn handle_client_message(
    state: &AppState,
    conn_id: &str,
    identity: &mut Option<Identity>,
    msg: ClientMessage,
) -> bool {
    match msg {
        ClientMessage::Register { token, admin_key } => {
            if identity.is_some() {
                send_error(&state.ws_manager, conn_id, "Already registered").await;
                return true;
            }
            match register(state, conn_id, token, admin_key).await {
                Some(new_identity) => {
                    send_json(
                        &state.ws_manager,
                        conn_id,
                        serde_json::json!({ "type": "ack", "status": "registered" }),
                    )
                    .await;
                    *identity = Some(new_identity);
                    true
                }
                None => {
                    send_error(&state.ws_manager, conn_id, "Registration failed").await;
                    false
                }
            }
        }

        ClientMessage::SendNotification {
            title,
            body,
            audience,
            user_ids,
        } => {
            let Some(identity) = identity.as_ref() else {
                send_error(&state.ws_manager, conn_id, "Expected a register message").await;
                return false;
            };
            if !identity.can_broadcast() {
                send_error(
                    &state.ws_manager,
                    conn_id,
                    "Only admins can send notifications",
                )
                .await;
                return true;
            }

            let input = CreateNotification {
                created_by: identity.author_id(),
                title,
                body,
                audience,
            };
            match dispatch::broadcast_notification(&state.pool, &state.ws_manager, input, user_ids)
                .await
            {
                Ok(outcome) => {
                    send_json(
                        &state.ws_manager,
                        conn_id,
                        serde_json::json!({
                            "type": "ack",
                            "notification_id": outcome.notification.id,
                            "recipient_count": outcome.recipient_count,
                            "delivered": outcome.delivered,
                        }),
                    )
                    .await;
                }
                Err(err) => {
                    send_error(&state.ws_manager, conn_id, &client_error_message(&err)).await;
                }
            }
            true
        }
    }
}

/// Check the register credentials and record the connection in the registry.
async fn register(
    state: &AppState,
    conn_id: &str,
    token: Option<String>,
    admin_key: Option<String>,
) -> Option<Identity> {
    if let Some(token) = token {
        let claims = validate_token(&token, &state.config.jwt).ok()?;
        if !state.ws_manager.register_user(conn_id, claims.sub).await {
            return None;
        }
        let is_admin = claims.role == ROLE_ADMIN;
        if is_admin {
            state.ws_manager.register_admin(conn_id).await;
        }
        tracing::info!(
            conn_id = %conn_id,
            user_id = claims.sub,
            role = %claims.role,
            "WebSocket registered"
        );
        return Some(Identity::User {
            user_id: claims.sub,
            is_admin,
        });
    }

    if let Some(key) = admin_key {
        let configured = state.config.admin_api_key.as_deref()?;
        if key == configured && state.ws_manager.register_admin(conn_id).await {
            tracing::info!(conn_id = %conn_id, "WebSocket registered via admin key");
            return Some(Identity::AdminKey);
        }
    }

    None
}

/// Domain errors go to the client verbatim; everything else is sanitized.
fn client_error_message(err: &AppError) -> String {
    match err {
        AppError::Core(core) => core.to_string(),
        _ => "Internal error".to_string(),
    }
}

async fn send_json(ws_manager: &WsManager, conn_id: &str, payload: serde_json::Value) {
    let _ = ws_manager
        .send_to_conn(conn_id, Message::Text(payload.to_string().into()))
        .await;
}

async fn send_error(ws_manager: &WsManager, conn_id: &str, message: &str) {
    send_json(
        ws_manager,
        conn_id,
        serde_json::json!({ "type": "error", "error": message }),
    )
    .await;
}
