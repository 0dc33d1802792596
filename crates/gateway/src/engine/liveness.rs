// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background liveness monitor for registered peers.

use std::sync::Arc;

use crate::events::GatewayEvent;
use crate::state::{epoch_ms, GatewayState};

/// Spawn a single background task that periodically pulls peer liveness
/// reports from the engine and folds them into the registry.
///
/// No-op when the gateway runs without an engine.
pub fn spawn_liveness_monitor(state: Arc<GatewayState>) {
    if state.engine.is_none() {
        return;
    }
    let interval = state.config.liveness_poll_interval();

    tokio::spawn(async move {
        let Some(engine) = state.engine.as_ref() else {
            return;
        };
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = state.shutdown.cancelled() => break,
                _ = timer.tick() => {}
            }

            let reports = match engine.peer_reports().await {
                Ok(reports) => reports,
                Err(e) => {
                    tracing::debug!(err = %e, "liveness poll failed");
                    continue;
                }
            };

            for report in reports {
                let seen = report.last_seen.unwrap_or_else(epoch_ms);
                let Some(change) =
                    state.registry.update_status(&report.id, report.status, seen).await
                else {
                    continue;
                };
                tracing::info!(
                    peer = %report.id,
                    prev = %change.prev,
                    next = %change.next,
                    "peer status changed"
                );
                state
                    .hub
                    .broadcast(GatewayEvent::PeerState {
                        peer: report.id.clone(),
                        prev: change.prev,
                        next: change.next,
                        last_seen: change.last_seen_ms,
                    })
                    .await;
            }
        }
    });
}
