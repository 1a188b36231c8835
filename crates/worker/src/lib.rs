// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mesh-worker: the per-agent worker process controller -- heartbeat,
//! mailbox drain, tool-call event wrapping, and defensive failure
//! handling, driven by pluggable model and tool seams.

mod controller;
mod error;
mod llm;
mod tool;

pub use controller::WorkerController;
pub use error::WorkerError;
pub use llm::{LlmClient, LlmError, LlmStep};
pub use tool::{ToolOutcome, ToolRunner};
