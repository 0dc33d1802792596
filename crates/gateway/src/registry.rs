// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory registry of known signaling peers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tokio::sync::RwLock;

use crate::error::GatewayError;

/// Liveness status of a signaling peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerStatus {
    Unknown,
    Connecting,
    Up,
    Down,
}

impl PeerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Connecting => "connecting",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl std::fmt::Display for PeerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered Diameter peer.
///
/// `status` and `last_seen` are owned by the liveness path; operator-facing
/// calls never set them directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Peer {
    pub id: String,
    pub host: String,
    pub ip: IpAddr,
    pub port: u16,
    pub realm: Option<String>,
    pub tls: bool,
    pub ca_cert: Option<String>,
    pub status: PeerStatus,
    /// Epoch millis of the engine's last observation of this peer.
    pub last_seen: Option<u64>,
}

/// Outcome of a liveness update that changed the peer's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub prev: PeerStatus,
    pub next: PeerStatus,
    pub last_seen_ms: u64,
}

/// Peer table. Insertion order is preserved so list output is stable.
#[derive(Default)]
pub struct PeerRegistry {
    peers: RwLock<IndexMap<String, Peer>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self { peers: RwLock::new(IndexMap::new()) }
    }

    /// Snapshot of all peers in registration order.
    pub async fn list(&self) -> Vec<Peer> {
        self.peers.read().await.values().cloned().collect()
    }

    pub async fn get(&self, id: &str) -> Option<Peer> {
        self.peers.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }

    /// Insert a new peer.
    ///
    /// The map insert under the write lock is the only admission point, so
    /// concurrent creates for one id produce exactly one winner.
    pub async fn insert(&self, peer: Peer) -> Result<(), GatewayError> {
        let mut peers = self.peers.write().await;
        if peers.contains_key(&peer.id) {
            return Err(GatewayError::Conflict);
        }
        peers.insert(peer.id.clone(), peer);
        Ok(())
    }

    /// Remove a peer, returning it if present.
    pub async fn remove(&self, id: &str) -> Option<Peer> {
        self.peers.write().await.shift_remove(id)
    }

    /// Apply a liveness report.
    ///
    /// Unknown ids are swallowed (liveness races with deletion) and reports
    /// older than the stored last-seen are discarded so last-seen never
    /// regresses. Returns the transition when the status actually changed.
    pub async fn update_status(
        &self,
        id: &str,
        status: PeerStatus,
        last_seen_ms: u64,
    ) -> Option<StatusChange> {
        let mut peers = self.peers.write().await;
        let Some(peer) = peers.get_mut(id) else {
            tracing::debug!(peer = %id, "liveness report for unknown peer");
            return None;
        };
        if let Some(seen) = peer.last_seen {
            if last_seen_ms < seen {
                tracing::debug!(peer = %id, "stale liveness report discarded");
                return None;
            }
        }
        let prev = peer.status;
        peer.status = status;
        peer.last_seen = Some(last_seen_ms);
        if prev == status {
            None
        } else {
            Some(StatusChange { prev, next: status, last_seen_ms })
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
