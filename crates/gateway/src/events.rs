// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway event types and the fan-out hub for operator event streams.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};

use crate::registry::PeerStatus;

// -- Wire-format event types -------------------------------------------------

/// Events pushed to subscribed operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    /// A peer's liveness status changed.
    PeerState { peer: String, prev: PeerStatus, next: PeerStatus, last_seen: u64 },
    /// A peer was added to the registry.
    PeerRegistered { peer: String, host: String },
    /// A peer was removed from the registry.
    PeerRemoved { peer: String },
    /// A traffic simulation was submitted to the engine.
    Simulation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        peer: Option<String>,
        kind: String,
        ok: bool,
    },
}

// -- Subscriber hub ----------------------------------------------------------

/// Per-subscriber queue depth. A subscriber this far behind is evicted rather
/// than allowed to stall the broadcast path.
pub const SUBSCRIBER_BUFFER: usize = 64;

struct SubscriberSlot {
    operator: String,
    tx: mpsc::Sender<GatewayEvent>,
}

/// Receive side handed to the transport layer for one admitted subscriber.
pub struct SubscriberHandle {
    pub id: u64,
    pub rx: mpsc::Receiver<GatewayEvent>,
}

/// Hub of admitted event subscribers — fans events out to all of them.
#[derive(Default)]
pub struct EventHub {
    subscribers: RwLock<HashMap<u64, SubscriberSlot>>,
    next_id: AtomicU64,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit an authenticated operator as a subscriber.
    pub async fn admit(&self, operator: &str) -> SubscriberHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        let slot = SubscriberSlot { operator: operator.to_string(), tx };
        self.subscribers.write().await.insert(id, slot);
        tracing::info!(subscriber = id, operator = %operator, "subscriber admitted");
        SubscriberHandle { id, rx }
    }

    /// Drop a subscriber. Safe to call again for an id already gone.
    pub async fn remove(&self, id: u64) {
        if self.subscribers.write().await.remove(&id).is_some() {
            tracing::info!(subscriber = id, "subscriber closed");
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Push an event to every subscriber without blocking.
    ///
    /// A subscriber whose queue is full, or whose receive side is gone, is
    /// evicted here so one stalled client cannot hold up the rest.
    pub async fn broadcast(&self, event: GatewayEvent) {
        let mut evicted = Vec::new();
        {
            let subscribers = self.subscribers.read().await;
            if subscribers.is_empty() {
                return;
            }
            for (id, slot) in subscribers.iter() {
                match slot.tx.try_send(event.clone()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::warn!(
                            subscriber = *id,
                            operator = %slot.operator,
                            "subscriber too slow, evicting"
                        );
                        evicted.push(*id);
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => evicted.push(*id),
                }
            }
        }
        if !evicted.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in evicted {
                subscribers.remove(&id);
            }
        }
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
