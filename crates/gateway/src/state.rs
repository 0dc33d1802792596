// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tokio_util::sync::CancellationToken;

use crate::auth::Authenticator;
use crate::config::GatewayConfig;
use crate::engine::client::EngineClient;
use crate::events::EventHub;
use crate::registry::PeerRegistry;

/// Shared gateway state.
pub struct GatewayState {
    pub registry: PeerRegistry,
    pub hub: EventHub,
    pub auth: Authenticator,
    /// Engine client, absent when the gateway runs registry-only.
    pub engine: Option<EngineClient>,
    pub config: GatewayConfig,
    pub shutdown: CancellationToken,
}

impl GatewayState {
    pub fn new(config: GatewayConfig, auth: Authenticator, shutdown: CancellationToken) -> Self {
        let engine = config
            .engine_url
            .as_deref()
            .map(|url| EngineClient::new(url, config.engine_timeout()));
        Self {
            registry: PeerRegistry::new(),
            hub: EventHub::new(),
            auth,
            engine,
            config,
            shutdown,
        }
    }
}

/// Return current epoch millis.
pub fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
