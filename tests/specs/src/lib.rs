// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Spawns the real `diamgate` binary as a subprocess and exercises it over
//! HTTP and WebSocket.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Once;
use std::time::Duration;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Safe to call multiple times — only the first call has effect.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Resolve the path to the compiled `diamgate` binary.
pub fn gateway_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("diamgate")
}

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Log in as the bootstrap admin operator and return a bearer token.
pub async fn login(base_url: &str) -> anyhow::Result<String> {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base_url}/api/v1/token"))
        .form(&[("username", "admin"), ("password", "admin")])
        .send()
        .await?;
    anyhow::ensure!(resp.status().is_success(), "login failed: {}", resp.status());
    let body: serde_json::Value = resp.json().await?;
    body["access_token"]
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| anyhow::anyhow!("no access_token in login response"))
}

/// A running `diamgate` process that is killed on drop.
pub struct GatewayProcess {
    child: Child,
    port: u16,
}

impl GatewayProcess {
    /// Spawn diamgate in registry-only mode (no engine).
    pub fn start() -> anyhow::Result<Self> {
        Self::spawn(None)
    }

    /// Spawn diamgate pointed at an engine management API.
    pub fn start_with_engine(engine_url: &str) -> anyhow::Result<Self> {
        Self::spawn(Some(engine_url))
    }

    fn spawn(engine_url: Option<&str>) -> anyhow::Result<Self> {
        ensure_crypto();
        let binary = gateway_binary();
        anyhow::ensure!(binary.exists(), "diamgate binary not found at {}", binary.display());

        let port = free_port()?;
        let mut args: Vec<String> = vec![
            "--host".into(),
            "127.0.0.1".into(),
            "--port".into(),
            port.to_string(),
            "--token-secret".into(),
            "diamgate-e2e-secret".into(),
        ];
        if let Some(url) = engine_url {
            args.extend(["--engine-url".into(), url.to_owned()]);
        }

        let child = Command::new(&binary)
            .args(&args)
            .env("RUST_LOG", "warn")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(Self { child, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL for HTTP requests.
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Event stream WebSocket URL carrying the given token.
    pub fn ws_url(&self, token: &str) -> String {
        format!("ws://127.0.0.1:{}/ws/events?token={token}", self.port)
    }

    /// Poll health until responsive.
    pub async fn wait_healthy(&self, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let client = reqwest::Client::new();
        let url = format!("{}/api/v1/health", self.base_url());
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("diamgate did not become healthy within {timeout:?}");
            }
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Poll health until the subscriber count reaches `want`.
    pub async fn wait_subscribers(&self, want: u64, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let client = reqwest::Client::new();
        let url = format!("{}/api/v1/health", self.base_url());
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("subscriber count never reached {want}");
            }
            if let Ok(resp) = client.get(&url).send().await {
                if let Ok(body) = resp.json::<serde_json::Value>().await {
                    if body["subscribers"].as_u64() == Some(want) {
                        return Ok(());
                    }
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Drop for GatewayProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
