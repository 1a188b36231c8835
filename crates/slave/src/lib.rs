// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mesh-slave: the cluster's worker-node client -- dials a configured
//! master, authenticates, and services inbound `agent.run` requests
//! through a pluggable handler, by default one that delegates to the
//! multi-agent coordinator.

mod backoff;
mod client;
mod error;
mod handler;
mod inflight;

pub use client::{SlaveClient, SlaveClientConfig};
pub use error::SlaveClientError;
pub use handler::{AgentRunHandler, AgentRunOutcome, CoordinatorHandler};
pub use inflight::InflightGate;
