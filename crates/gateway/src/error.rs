// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for the gateway API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    InvalidCredentials,
    InvalidToken,
    BadRequest,
    Conflict,
    NotFound,
    BackendUnavailable,
    /// The engine answered with a non-success status. Its status and body
    /// are relayed to the caller untouched.
    BackendError { status: u16, body: String },
    Internal,
}

impl GatewayError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidCredentials | Self::InvalidToken => 401,
            Self::BadRequest => 400,
            Self::Conflict => 409,
            Self::NotFound => 404,
            Self::BackendUnavailable => 503,
            Self::BackendError { status, .. } => *status,
            Self::Internal => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "UNAUTHORIZED",
            Self::BadRequest => "BAD_REQUEST",
            Self::Conflict => "CONFLICT",
            Self::NotFound => "NOT_FOUND",
            Self::BackendUnavailable => "BACKEND_UNAVAILABLE",
            Self::BackendError { .. } => "BACKEND_ERROR",
            Self::Internal => "INTERNAL",
        }
    }

    pub fn to_error_body(&self, message: impl Into<String>) -> ErrorBody {
        ErrorBody { code: self.as_str().to_owned(), message: message.into() }
    }

    /// Build the HTTP response for this error.
    ///
    /// `BackendError` bypasses the envelope: the engine's status and body go
    /// out as-is, so callers see exactly what the engine said.
    pub fn to_http_response(&self, message: impl Into<String>) -> Response {
        if let Self::BackendError { status, body } = self {
            return axum::http::Response::builder()
                .status(StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY))
                .body(axum::body::Body::from(body.clone()))
                .unwrap_or_default()
                .into_response();
        }
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse { error: self.to_error_body(message) };
        (status, Json(body)).into_response()
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body with machine-readable code and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
