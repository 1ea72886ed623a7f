use crate::ws::connection::{self, Heartbeat};
use crate::{AppState, Error};
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::Response;
use log::*;
use relay::connection::{ConnectionId, Handshake};
use serde::Deserialize;
use tokio::sync::mpsc;

/// Handshake data sent as query parameters: `GET /ws?userId=...`
#[derive(Debug, Deserialize)]
pub(crate) struct HandshakeParams {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// GET /ws?userId=ID
///
/// The connection is admitted into the relay before the upgrade completes, so a
/// handshake without a user id is refused with 401 and never reaches the registry.
/// If the upgrade itself fails, the connection context is dropped and the
/// connection is unregistered again.
pub(crate) async fn ws_upgrade(
    State(app_state): State<AppState>,
    Query(params): Query<HandshakeParams>,
    ws: WebSocketUpgrade,
) -> Result<Response, Error> {
    let (tx, rx) = mpsc::unbounded_channel();
    let ping_tx = tx.clone();
    let handshake = Handshake::new(ConnectionId::new(), params.user_id);

    let context = app_state.relay_manager.connect(handshake, tx)?;
    debug!(
        "WebSocket handshake accepted for user {} as connection {}",
        context.user_id(),
        context.connection_id()
    );

    let manager = app_state.relay_manager.clone();
    let heartbeat = Heartbeat::from_config(&app_state.config);
    Ok(ws.on_upgrade(move |socket| {
        connection::run_connection(socket, manager, context, ping_tx, rx, heartbeat)
    }))
}
