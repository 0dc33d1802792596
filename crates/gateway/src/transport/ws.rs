// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket event stream for operator clients.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::auth::Operator;
use crate::state::GatewayState;

/// Query parameters for the events WS upgrade.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsQuery {
    pub token: Option<String>,
}

/// `GET /ws/events` — WebSocket upgrade for the gateway event stream.
///
/// The token is validated before the upgrade; a bad or missing token gets a
/// plain 401 instead of a handshake.
pub async fn ws_events(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<EventsQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let operator = match query.token.as_deref().map(|t| state.auth.authenticate(t)) {
        Some(Ok(operator)) => operator,
        _ => {
            return axum::http::Response::builder()
                .status(401)
                .body(axum::body::Body::from("unauthorized"))
                .unwrap_or_default()
                .into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_events(socket, state, operator)).into_response()
}

/// Per-connection handler: admitted, streaming, then closed.
async fn handle_events(socket: WebSocket, state: Arc<GatewayState>, operator: Operator) {
    let mut handle = state.hub.admit(&operator.username).await;
    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => break,

            // Forward hub events to the client.
            event = handle.rx.recv() => {
                let Some(event) = event else {
                    // Queue gone: the hub evicted this subscriber.
                    break;
                };
                let Ok(text) = serde_json::to_string(&event) else {
                    continue;
                };
                if ws_tx.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }

            // Drain the client side; anything but a close is ignored.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    state.hub.remove(handle.id).await;
}
