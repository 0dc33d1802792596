// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diamgate: control-plane gateway for a Diameter signaling engine.

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod registry;
pub mod state;
pub mod transport;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::auth::Authenticator;
use crate::config::GatewayConfig;
use crate::engine::liveness::spawn_liveness_monitor;
use crate::state::GatewayState;
use crate::transport::build_router;

/// Run the gateway server until shutdown.
pub async fn run(config: GatewayConfig) -> anyhow::Result<()> {
    // reqwest's rustls backend ships without a default crypto provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    let auth = Authenticator::from_config(&config)?;
    let state = Arc::new(GatewayState::new(config, auth, shutdown.clone()));

    if state.engine.is_some() {
        tracing::info!("diamgate listening on {addr} (engine attached)");
    } else {
        tracing::info!("diamgate listening on {addr} (registry only)");
    }
    spawn_liveness_monitor(Arc::clone(&state));

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
    }

    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    Ok(())
}
