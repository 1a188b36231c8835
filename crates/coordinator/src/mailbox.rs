// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SendMessage and the worker-side mailbox drain.
//!
//! Messages sent between agents are appended to the recipient's
//! `history.jsonl` with a monotonic sequence number. The worker drains
//! everything past its last-delivered cursor (persisted on `state.json` as
//! `mailbox_cursor`) before each model call and injects each as a synthetic
//! user-role message.

use crate::coordinator::Coordinator;
use crate::error::CoordinatorError;
use crate::paths;
use mesh_storage::{append_with_next_seq, read_jsonl_since};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MailboxMessage {
    pub seq: u64,
    pub at_ms: u64,
    pub payload: serde_json::Value,
}

impl Coordinator {
    pub fn send_message(
        &self,
        run_id: &str,
        agent_id: &str,
        payload: serde_json::Value,
    ) -> Result<MailboxMessage, CoordinatorError> {
        let path = paths::history_jsonl(&self.root, run_id, agent_id);
        let at_ms = self.clock.now_ms();
        let message = append_with_next_seq(
            &path,
            |m: &MailboxMessage| m.seq,
            |seq| MailboxMessage { seq, at_ms, payload },
        )?;
        Ok(message)
    }

    /// Returns every undelivered message and advances `mailbox_cursor` on
    /// `state.json` past the last one returned.
    pub fn drain_mailbox(
        &self,
        run_id: &str,
        agent_id: &str,
    ) -> Result<Vec<MailboxMessage>, CoordinatorError> {
        let agent = self.read_state(run_id, agent_id)?;
        let path = paths::history_jsonl(&self.root, run_id, agent_id);
        let mut pending: Vec<MailboxMessage> = read_jsonl_since(&path, agent.mailbox_cursor, |m| m.seq)?;
        pending.sort_by_key(|m| m.seq);

        if let Some(last) = pending.last() {
            let cursor = last.seq;
            self.update_state(run_id, agent_id, |a| a.mailbox_cursor = cursor)?;
        }

        Ok(pending)
    }
}

#[cfg(test)]
#[path = "mailbox_tests.rs"]
mod tests;
