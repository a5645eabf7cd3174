//! `WebSocket` handler for live session updates.
//!
//! Clients connect to `GET /ws/updates`. The first frame is an `initial`
//! update carrying the current snapshot; after that every
//! [`SessionUpdate`] published by the session is forwarded as a JSON text
//! frame. A client that falls behind skips to the newest update.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use tycoon_core::SessionUpdate;
use tycoon_provider::TaskContentProvider;

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming session updates.
///
/// # Route
///
/// `GET /ws/updates`
pub async fn ws_updates<P: TaskContentProvider + 'static>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<P>>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

async fn handle_ws<P: TaskContentProvider + 'static>(
    mut socket: WebSocket,
    state: Arc<AppState<P>>,
) {
    debug!("WebSocket client connected");

    // Subscribe before capturing so no update falls between the two.
    let mut rx = state.subscribe();
    let initial = serde_json::json!({
        "reason": "initial",
        "snapshot": state.session.snapshot().await,
    });
    if socket
        .send(Message::Text(initial.to_string().into()))
        .await
        .is_err()
    {
        debug!("WebSocket client disconnected before initial snapshot");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(update) => {
                        if !forward(&mut socket, &update).await {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("update channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    // Clients drive the session over REST.
                    _ => {}
                }
            }
        }
    }
}

/// Send one update. Returns `false` once the client is gone.
async fn forward(socket: &mut WebSocket, update: &SessionUpdate) -> bool {
    let json = match serde_json::to_string(update) {
        Ok(j) => j,
        Err(e) => {
            warn!("failed to serialize session update: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}
