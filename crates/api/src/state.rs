use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: waterline_db::DbPool,
    /// Server configuration (JWT, admin key, CORS, timeouts).
    pub config: Arc<ServerConfig>,
    /// WebSocket connection registry for live notification delivery.
    pub ws_manager: Arc<WsManager>,
    /// In-process event bus carrying complaint lifecycle events.
    pub event_bus: Arc<waterline_events::EventBus>,
    /// SMTP mailer for password-reset links. `None` when SMTP is not
    /// configured; the forgot-password flow then skips sending.
    pub email: Option<Arc<waterline_events::EmailDelivery>>,
}
