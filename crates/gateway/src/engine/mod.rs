// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signaling engine communication: HTTP client and liveness monitor.

pub mod client;
pub mod liveness;
