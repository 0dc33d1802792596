// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the gateway API.

use std::net::IpAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::engine::client::SimulationRequest;
use crate::error::GatewayError;
use crate::events::GatewayEvent;
use crate::registry::{Peer, PeerStatus};
use crate::state::GatewayState;
use crate::transport::auth::AuthedOperator;

// -- Request/Response types ---------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub peers: usize,
    pub subscribers: usize,
}

#[derive(Debug, Deserialize)]
pub struct PeerCreate {
    pub id: String,
    pub host: String,
    pub ip: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub realm: Option<String>,
    #[serde(default = "default_tls")]
    pub tls: bool,
    #[serde(default)]
    pub ca_cert: Option<String>,
}

fn default_port() -> u16 {
    3868
}

fn default_tls() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub id: String,
    pub removed: bool,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /` — service banner.
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "diamgate",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "running".to_owned(),
        peers: s.registry.len().await,
        subscribers: s.hub.subscriber_count().await,
    })
}

/// `POST /api/v1/token` — verify credentials and issue an access token.
pub async fn login(
    State(s): State<Arc<GatewayState>>,
    Form(form): Form<LoginForm>,
) -> impl IntoResponse {
    match s.auth.login(&form.username, &form.password) {
        Ok(token) => {
            tracing::info!(operator = %form.username, "token issued");
            Json(TokenResponse { access_token: token, token_type: "bearer".to_owned() })
                .into_response()
        }
        Err(e) => {
            tracing::warn!(operator = %form.username, "login rejected");
            e.to_http_response("invalid credentials")
        }
    }
}

/// `GET /api/v1/peers` — list registered peers in registration order.
pub async fn list_peers(State(s): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(s.registry.list().await)
}

/// `POST /api/v1/peers` — register a peer.
pub async fn create_peer(
    State(s): State<Arc<GatewayState>>,
    AuthedOperator(operator): AuthedOperator,
    Json(req): Json<PeerCreate>,
) -> impl IntoResponse {
    if req.id.trim().is_empty() || req.host.trim().is_empty() {
        return GatewayError::BadRequest.to_http_response("id and host are required");
    }

    let peer = Peer {
        id: req.id,
        host: req.host,
        ip: req.ip,
        port: req.port,
        realm: req.realm,
        tls: req.tls,
        ca_cert: req.ca_cert,
        status: PeerStatus::Unknown,
        last_seen: None,
    };

    if let Err(e) = s.registry.insert(peer.clone()).await {
        return e.to_http_response("peer exists");
    }

    // Confirm provisioning before answering; a peer the engine refused is
    // rolled back out of the registry.
    if let Some(engine) = s.engine.as_ref() {
        if let Err(e) = engine.provision_peer(&peer).await {
            s.registry.remove(&peer.id).await;
            tracing::warn!(
                peer = %peer.id,
                err = %e,
                "provisioning failed, registration rolled back"
            );
            return engine_failure(e);
        }
    }

    tracing::info!(
        peer = %peer.id,
        host = %peer.host,
        operator = %operator.username,
        "peer registered"
    );
    s.hub
        .broadcast(GatewayEvent::PeerRegistered { peer: peer.id.clone(), host: peer.host.clone() })
        .await;
    Json(peer).into_response()
}

/// `DELETE /api/v1/peers/{id}` — remove a peer.
pub async fn remove_peer(
    State(s): State<Arc<GatewayState>>,
    AuthedOperator(operator): AuthedOperator,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match s.registry.remove(&id).await {
        Some(_) => {
            tracing::info!(peer = %id, operator = %operator.username, "peer removed");
            s.hub.broadcast(GatewayEvent::PeerRemoved { peer: id.clone() }).await;
            Json(RemoveResponse { id, removed: true }).into_response()
        }
        None => GatewayError::NotFound.to_http_response("peer not found"),
    }
}

/// `GET /api/v1/sessions` — active Diameter sessions, straight from the engine.
pub async fn sessions(State(s): State<Arc<GatewayState>>) -> impl IntoResponse {
    let Some(engine) = s.engine.as_ref() else {
        return Json(serde_json::json!({ "sessions": [] })).into_response();
    };
    match engine.sessions().await {
        Ok(value) => Json(value).into_response(),
        Err(e) => engine_failure(e),
    }
}

/// `POST /api/v1/simulate` — forward a traffic simulation to the engine.
pub async fn simulate(
    State(s): State<Arc<GatewayState>>,
    AuthedOperator(operator): AuthedOperator,
    Json(req): Json<SimulationRequest>,
) -> impl IntoResponse {
    let Some(engine) = s.engine.as_ref() else {
        return GatewayError::BackendUnavailable.to_http_response("engine not configured");
    };

    let outcome = engine.simulate(&req).await;
    s.hub
        .broadcast(GatewayEvent::Simulation {
            peer: req.peer_id.clone(),
            kind: req.kind.clone(),
            ok: outcome.is_ok(),
        })
        .await;

    match outcome {
        Ok(value) => {
            tracing::info!(kind = %req.kind, operator = %operator.username, "simulation accepted");
            Json(value).into_response()
        }
        Err(e) => {
            tracing::warn!(kind = %req.kind, err = %e, "simulation failed");
            engine_failure(e)
        }
    }
}

/// Build the response for a failed engine call. `BackendError` relays the
/// engine's own status and body, so the message only reaches the other arms.
fn engine_failure(e: GatewayError) -> axum::response::Response {
    let message = match e {
        GatewayError::BackendUnavailable => "engine unreachable",
        _ => "engine error",
    };
    e.to_http_response(message)
}
