// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::Operator;
use crate::error::GatewayError;
use crate::state::GatewayState;

/// Extract the Bearer token from HTTP headers.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, GatewayError> {
    let header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(GatewayError::InvalidToken)?;
    header.strip_prefix("Bearer ").ok_or(GatewayError::InvalidToken)
}

/// Axum middleware that enforces bearer-token authentication.
///
/// Exempt: the service banner, token issuance, health, and WebSocket
/// upgrades (`/ws/`). WS auth is handled via query param in the WS handler.
pub async fn auth_layer(
    State(state): State<Arc<GatewayState>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();

    if path == "/"
        || path == "/api/v1/token"
        || path == "/api/v1/health"
        || path.starts_with("/ws/")
    {
        return next.run(req).await;
    }

    let verdict =
        bearer_token(req.headers()).and_then(|token| state.auth.authenticate(token));
    match verdict {
        Ok(operator) => {
            req.extensions_mut().insert(operator);
            next.run(req).await
        }
        Err(e) => e.to_http_response("unauthorized"),
    }
}

/// The operator resolved by `auth_layer`, for handlers that need the caller's
/// identity.
pub struct AuthedOperator(pub Operator);

impl<S> FromRequestParts<S> for AuthedOperator
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Operator>()
            .cloned()
            .map(AuthedOperator)
            .ok_or_else(|| GatewayError::InvalidToken.to_http_response("unauthorized"))
    }
}
