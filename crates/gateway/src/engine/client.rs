// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the Diameter signaling engine's management API.

use std::time::Duration;

use indexmap::IndexMap;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::registry::{Peer, PeerStatus};

/// Peer liveness report as returned by the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct PeerReport {
    pub id: String,
    pub status: PeerStatus,
    #[serde(default)]
    pub last_seen: Option<u64>,
}

/// A traffic simulation request, forwarded to the engine as-is.
///
/// `avps` is an open map; unknown AVPs pass through and their order is
/// preserved on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_id: Option<String>,
    #[serde(default)]
    pub avps: IndexMap<String, serde_json::Value>,
}

/// HTTP client wrapper for one signaling engine.
pub struct EngineClient {
    base_url: String,
    client: Client,
}

impl EngineClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_default();
        Self { base_url: base_url.trim_end_matches('/').to_string(), client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Submit a traffic simulation and return the engine's response body.
    pub async fn simulate(
        &self,
        request: &SimulationRequest,
    ) -> Result<serde_json::Value, GatewayError> {
        self.post_json("/simulate", request).await
    }

    /// Ask the engine to open transport for a newly registered peer.
    pub async fn provision_peer(&self, peer: &Peer) -> Result<serde_json::Value, GatewayError> {
        self.post_json("/peers", peer).await
    }

    /// Fetch liveness reports for every peer the engine tracks.
    pub async fn peer_reports(&self) -> Result<Vec<PeerReport>, GatewayError> {
        let resp = self.client.get(self.url("/peers")).send().await.map_err(unavailable)?;
        let resp = relay_status(resp).await?;
        resp.json().await.map_err(malformed)
    }

    /// Fetch active Diameter sessions from the engine.
    pub async fn sessions(&self) -> Result<serde_json::Value, GatewayError> {
        let resp = self.client.get(self.url("/sessions")).send().await.map_err(unavailable)?;
        let resp = relay_status(resp).await?;
        resp.json().await.map_err(malformed)
    }

    /// POST JSON to an engine endpoint and return the response body.
    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<serde_json::Value, GatewayError> {
        let resp =
            self.client.post(self.url(path)).json(body).send().await.map_err(unavailable)?;
        let resp = relay_status(resp).await?;
        let bytes = resp.bytes().await.map_err(unavailable)?;
        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(malformed)
    }
}

/// Map a transport-level failure (refused, timed out, DNS) to unavailability.
fn unavailable(err: reqwest::Error) -> GatewayError {
    tracing::debug!(err = %err, "engine unreachable");
    GatewayError::BackendUnavailable
}

fn malformed<E: std::fmt::Display>(err: E) -> GatewayError {
    tracing::debug!(err = %err, "engine returned malformed JSON");
    GatewayError::Internal
}

/// Pass 2xx responses through; relay anything else verbatim as an engine error.
async fn relay_status(resp: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(GatewayError::BackendError { status: status.as_u16(), body })
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
