//! WebSocket upgrade handler and per-connection event loop.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use squadlink_common::id::{prefix, prefixed_ulid};

use crate::AppState;

use super::events::{ClientEvent, ServerEvent};
use super::fanout::RoomPayload;
use super::session::SessionManager;

pub fn router() -> Router<AppState> {
    Router::new().route("/gateway", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: AppState) {
    // The transport assigns the identity; it is ephemeral and never reused.
    let connection_id = prefixed_ulid(prefix::CONNECTION);
    state.registry.connect(&connection_id);

    let session = SessionManager::new(
        state.squads.clone(),
        state.registry.clone(),
        state.broadcast.clone(),
    );
    let broadcast_rx = state.broadcast.subscribe();

    tracing::info!(%connection_id, "operative connected");

    run_connection(&connection_id, socket, &state, &session, broadcast_rx).await;

    // Cleanup is idempotent and runs for never-joined connections too; the
    // socket is already gone, so nothing here can fail loudly.
    session.disconnect(&connection_id);
    tracing::info!(%connection_id, "operative disconnected");
}

/// Main connection loop: read client events, forward room broadcasts.
async fn run_connection(
    connection_id: &str,
    socket: WebSocket,
    state: &AppState,
    session: &SessionManager,
    mut broadcast_rx: broadcast::Receiver<Arc<RoomPayload>>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            // Client sends us an event.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        // A malformed event rejects that request only; the
                        // connection stays up.
                        let reply = match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(event) => session.handle(connection_id, event),
                            Err(e) => {
                                tracing::debug!(%connection_id, %e, "unparseable client event");
                                Some(ServerEvent::error("Evento inválido o incompleto."))
                            }
                        };
                        if let Some(reply) = reply {
                            let json = serde_json::to_string(&reply).unwrap();
                            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, %connection_id, "ws read error");
                        break;
                    }
                    _ => continue,
                }
            }

            // Room event from the fanout hub.
            result = broadcast_rx.recv() => {
                match result {
                    Ok(payload) => {
                        if payload.exclude.as_deref() == Some(connection_id) {
                            continue;
                        }
                        // Deliver only events for the room this connection is
                        // currently in; the registry lookup avoids scanning
                        // the squad store.
                        if state.registry.squad_of(connection_id).as_deref()
                            != Some(payload.room.as_str())
                        {
                            continue;
                        }

                        let json = serde_json::to_string(&payload.event).unwrap();
                        if ws_tx.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            %connection_id,
                            skipped = n,
                            "connection lagged behind room broadcast"
                        );
                        // Continue — we just drop the missed events.
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        }
    }
}
