use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};
use waterline_core::types::{DbId, Timestamp};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Authenticated user ID, set once the connection registers with a token.
    pub user_id: Option<DbId>,
    /// Whether this connection has joined the admin set.
    pub is_admin: bool,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Everything the registry tracks, behind one lock so the connection map,
/// the per-user index, and the admin set can never drift apart.
#[derive(Default)]
struct Registry {
    connections: HashMap<String, WsConnection>,
    /// user_id -> conn_id of the most recently registered connection.
    user_index: HashMap<DbId, String>,
    admin_conns: HashSet<String>,
}

/// Manages all active WebSocket connections.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc`,
/// owned by `AppState`, and shared across the application.
///
/// User registration is last-connection-wins: registering a second device
/// for the same user replaces the index entry, so user-directed pushes only
/// reach the most recent connection. The superseded connection stays open
/// (it still receives pings and admin traffic if it is an admin) until its
/// own socket closes.
pub struct WsManager {
    registry: RwLock<Registry>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
        }
    }

    /// Add a new, not-yet-registered connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id: None,
            is_admin: false,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.registry.write().await.connections.insert(conn_id, conn);
        rx
    }

    /// Register a connection as belonging to a user. Last connection wins:
    /// any earlier index entry for the same user is replaced.
    ///
    /// Returns `false` when the connection is not in the registry (already
    /// removed), in which case nothing is recorded.
    pub async fn register_user(&self, conn_id: &str, user_id: DbId) -> bool {
        let mut registry = self.registry.write().await;
        match registry.connections.get_mut(conn_id) {
            Some(conn) => {
                conn.user_id = Some(user_id);
                registry.user_index.insert(user_id, conn_id.to_string());
                true
            }
            None => false,
        }
    }

    /// Register a connection into the admin set.
    ///
    /// Returns `false` when the connection is not in the registry.
    pub async fn register_admin(&self, conn_id: &str) -> bool {
        let mut registry = self.registry.write().await;
        match registry.connections.get_mut(conn_id) {
            Some(conn) => {
                conn.is_admin = true;
                registry.admin_conns.insert(conn_id.to_string());
                true
            }
            None => false,
        }
    }

    /// Remove a connection by its ID. Idempotent.
    ///
    /// The user index entry is evicted only if it still points at this
    /// connection, so removing a superseded connection never unregisters
    /// the newer one.
    pub async fn remove(&self, conn_id: &str) {
        let mut registry = self.registry.write().await;
        let removed = registry.connections.remove(conn_id);
        registry.admin_conns.remove(conn_id);
        if let Some(conn) = removed {
            if let Some(user_id) = conn.user_id {
                if registry.user_index.get(&user_id).map(String::as_str) == Some(conn_id) {
                    registry.user_index.remove(&user_id);
                }
            }
        }
    }

    /// Send a message to the connection currently registered for a user.
    ///
    /// Returns `true` when a registered connection existed and the push was
    /// attempted. A closed channel still counts as attempted; the dead
    /// connection is cleaned up by its own receive loop.
    pub async fn send_to_user(&self, user_id: DbId, message: Message) -> bool {
        let registry = self.registry.read().await;
        let conn = registry
            .user_index
            .get(&user_id)
            .and_then(|conn_id| registry.connections.get(conn_id));
        match conn {
            Some(conn) => {
                let _ = conn.sender.send(message);
                true
            }
            None => false,
        }
    }

    /// Send a message to a specific connection (ack and error frames).
    pub async fn send_to_conn(&self, conn_id: &str, message: Message) -> bool {
        let registry = self.registry.read().await;
        match registry.connections.get(conn_id) {
            Some(conn) => {
                let _ = conn.sender.send(message);
                true
            }
            None => false,
        }
    }

    /// Push a message to every connection in the admin set.
    ///
    /// Returns the number of admin connections the message was sent to.
    pub async fn notify_admins(&self, message: Message) -> usize {
        let registry = self.registry.read().await;
        let mut count = 0;
        for conn_id in &registry.admin_conns {
            if let Some(conn) = registry.connections.get(conn_id) {
                let _ = conn.sender.send(message.clone());
                count += 1;
            }
        }
        count
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.registry.read().await.connections.len()
    }

    /// Return the number of users with a registered connection.
    pub async fn registered_user_count(&self) -> usize {
        self.registry.read().await.user_index.len()
    }

    /// Send a Close frame to every connection, then clear the registry.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut registry = self.registry.write().await;
        let count = registry.connections.len();
        for conn in registry.connections.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        registry.connections.clear();
        registry.user_index.clear();
        registry.admin_conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) {
        let registry = self.registry.read().await;
        for conn in registry.connections.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
