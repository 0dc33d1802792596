// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Configuration for the diamgate control plane.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "diamgate", version, about = "Control-plane gateway for a Diameter signaling engine")]
pub struct GatewayConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "DIAMGATE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8180, env = "DIAMGATE_PORT")]
    pub port: u16,

    /// Path to the operators JSON file. If unset, a bootstrap admin operator
    /// is created with password "admin".
    #[arg(long, env = "DIAMGATE_OPERATORS_FILE")]
    pub operators_file: Option<std::path::PathBuf>,

    /// Secret for signing access tokens. If unset, a random per-process
    /// secret is generated and tokens do not survive a restart.
    #[arg(long, env = "DIAMGATE_TOKEN_SECRET", hide_env_values = true)]
    pub token_secret: Option<String>,

    /// Access token lifetime in minutes.
    #[arg(long, default_value_t = 60, env = "DIAMGATE_TOKEN_TTL_MINS")]
    pub token_ttl_mins: u64,

    /// Base URL of the Diameter engine's management API. If unset, the
    /// gateway runs registry-only: no provisioning, no relay, no liveness.
    #[arg(long, env = "DIAMGATE_ENGINE_URL")]
    pub engine_url: Option<String>,

    /// Engine request timeout in milliseconds.
    #[arg(long, default_value_t = 15000, env = "DIAMGATE_ENGINE_TIMEOUT_MS")]
    pub engine_timeout_ms: u64,

    /// Peer liveness poll interval in milliseconds.
    #[arg(long, default_value_t = 10000, env = "DIAMGATE_LIVENESS_POLL_MS")]
    pub liveness_poll_ms: u64,

    /// Log format (json or text).
    #[arg(long, default_value = "text", env = "DIAMGATE_LOG_FORMAT")]
    pub log_format: String,
}

impl GatewayConfig {
    pub fn engine_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.engine_timeout_ms)
    }

    pub fn liveness_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.liveness_poll_ms)
    }

    pub fn token_ttl_secs(&self) -> u64 {
        self.token_ttl_mins * 60
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
