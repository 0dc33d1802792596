// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP + WebSocket transport for the gateway.

pub mod auth;
pub mod http;
pub mod ws;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::GatewayState;

/// Build the axum `Router` with all gateway routes.
pub fn build_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        // Banner and health (no auth)
        .route("/", get(http::root))
        .route("/api/v1/health", get(http::health))
        // Token issuance
        .route("/api/v1/token", post(http::login))
        // Peer registry
        .route("/api/v1/peers", get(http::list_peers).post(http::create_peer))
        .route("/api/v1/peers/{id}", delete(http::remove_peer))
        // Engine passthrough
        .route("/api/v1/sessions", get(http::sessions))
        .route("/api/v1/simulate", post(http::simulate))
        // Event stream (token via query param)
        .route("/ws/events", get(ws::ws_events))
        // Middleware
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_layer))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
