// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mesh-storage: atomic on-disk primitives shared by the coordinator and
//! the file-transfer codec -- write-to-temp + rename for JSON records,
//! lock-guarded capped appends for JSONL logs, and digesting helpers.

pub mod atomic;
pub mod digest;
pub mod jsonl;
pub mod restart;

pub use atomic::{read_json, write_bytes_atomic, write_json_atomic, FileMode, StorageError};
pub use digest::{sha256_hex, Sha256Digest};
pub use jsonl::{append_jsonl_line, append_with_next_seq, read_jsonl_since, JsonlError};
pub use restart::{RestartError, RestartManager};
