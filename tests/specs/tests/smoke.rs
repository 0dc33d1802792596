// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real `diamgate` binary and exercise
//! the HTTP API and the WebSocket event stream.

use std::time::Duration;

use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::Message;

use diamgate::events::GatewayEvent;
use diamgate_specs::{login, GatewayProcess};

const TIMEOUT: Duration = Duration::from_secs(10);

// -- HTTP ---------------------------------------------------------------------

#[tokio::test]
async fn http_banner_and_health() -> anyhow::Result<()> {
    let gateway = GatewayProcess::start()?;
    gateway.wait_healthy(TIMEOUT).await?;

    let resp: serde_json::Value =
        reqwest::get(format!("{}/", gateway.base_url())).await?.json().await?;
    assert_eq!(resp["service"], "diamgate");

    let resp: serde_json::Value =
        reqwest::get(format!("{}/api/v1/health", gateway.base_url())).await?.json().await?;
    assert_eq!(resp["status"], "running");
    assert_eq!(resp["peers"], 0);
    assert_eq!(resp["subscribers"], 0);

    Ok(())
}

#[tokio::test]
async fn http_rejects_requests_without_token() -> anyhow::Result<()> {
    let gateway = GatewayProcess::start()?;
    gateway.wait_healthy(TIMEOUT).await?;

    let resp = reqwest::get(format!("{}/api/v1/peers", gateway.base_url())).await?;
    assert_eq!(resp.status().as_u16(), 401);

    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert_eq!(body["error"]["message"], "unauthorized");

    Ok(())
}

#[tokio::test]
async fn http_login_and_peer_crud() -> anyhow::Result<()> {
    let gateway = GatewayProcess::start()?;
    gateway.wait_healthy(TIMEOUT).await?;

    let token = login(&gateway.base_url()).await?;
    let client = reqwest::Client::new();

    // Register a peer with only the required fields; defaults fill the rest.
    let resp = client
        .post(format!("{}/api/v1/peers", gateway.base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "id": "p1", "host": "hss1.example.net", "ip": "10.0.0.1" }))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);
    let peer: serde_json::Value = resp.json().await?;
    assert_eq!(peer["id"], "p1");
    assert_eq!(peer["port"], 3868);
    assert_eq!(peer["tls"], true);
    assert_eq!(peer["status"], "unknown");

    // Duplicate registration conflicts.
    let resp = client
        .post(format!("{}/api/v1/peers", gateway.base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "id": "p1", "host": "hss1.example.net", "ip": "10.0.0.1" }))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 409);

    let resp = client
        .get(format!("{}/api/v1/peers", gateway.base_url()))
        .bearer_auth(&token)
        .send()
        .await?;
    let list: Vec<serde_json::Value> = resp.json().await?;
    assert_eq!(list.len(), 1);

    let resp = client
        .delete(format!("{}/api/v1/peers/p1", gateway.base_url()))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["removed"], true);

    let resp = client
        .delete(format!("{}/api/v1/peers/p1", gateway.base_url()))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 404);

    let resp = client
        .get(format!("{}/api/v1/peers", gateway.base_url()))
        .bearer_auth(&token)
        .send()
        .await?;
    let list: Vec<serde_json::Value> = resp.json().await?;
    assert!(list.is_empty());

    Ok(())
}

#[tokio::test]
async fn http_sessions_empty_without_engine() -> anyhow::Result<()> {
    let gateway = GatewayProcess::start()?;
    gateway.wait_healthy(TIMEOUT).await?;

    let token = login(&gateway.base_url()).await?;
    let resp = reqwest::Client::new()
        .get(format!("{}/api/v1/sessions", gateway.base_url()))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body, serde_json::json!({ "sessions": [] }));

    Ok(())
}

#[tokio::test]
async fn http_simulate_unavailable_without_engine() -> anyhow::Result<()> {
    let gateway = GatewayProcess::start()?;
    gateway.wait_healthy(TIMEOUT).await?;

    let token = login(&gateway.base_url()).await?;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/v1/simulate", gateway.base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "type": "ccr", "avps": {} }))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 503);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["error"]["code"], "BACKEND_UNAVAILABLE");

    Ok(())
}

// -- WebSocket ----------------------------------------------------------------

#[tokio::test]
async fn ws_streams_registry_events() -> anyhow::Result<()> {
    let gateway = GatewayProcess::start()?;
    gateway.wait_healthy(TIMEOUT).await?;

    let token = login(&gateway.base_url()).await?;
    let (mut ws, _) = tokio_tungstenite::connect_async(gateway.ws_url(&token)).await?;

    // The handshake completes before the hub admits the subscriber; wait for
    // admission so the registration event cannot be missed.
    gateway.wait_subscribers(1, TIMEOUT).await?;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/v1/peers", gateway.base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "id": "p1", "host": "hss1.example.net", "ip": "10.0.0.1" }))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);

    let msg = tokio::time::timeout(TIMEOUT, ws.next())
        .await?
        .ok_or_else(|| anyhow::anyhow!("ws stream ended"))??;
    let text = match msg {
        Message::Text(t) => t.to_string(),
        other => anyhow::bail!("expected text ws message, got: {other:?}"),
    };

    let event: GatewayEvent = serde_json::from_str(&text)?;
    match event {
        GatewayEvent::PeerRegistered { peer, host } => {
            assert_eq!(peer, "p1");
            assert_eq!(host, "hss1.example.net");
        }
        other => anyhow::bail!("expected peer_registered event, got: {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn ws_rejects_bad_token() -> anyhow::Result<()> {
    let gateway = GatewayProcess::start()?;
    gateway.wait_healthy(TIMEOUT).await?;

    let err = match tokio_tungstenite::connect_async(gateway.ws_url("not-a-token")).await {
        Ok(_) => anyhow::bail!("handshake must not succeed with a bad token"),
        Err(e) => e,
    };
    match err {
        tokio_tungstenite::tungstenite::Error::Http(resp) => {
            assert_eq!(resp.status().as_u16(), 401);
        }
        other => anyhow::bail!("expected HTTP error, got: {other:?}"),
    }

    Ok(())
}
