// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! AppendEvent and ReadEvents over `events.jsonl`.

use crate::coordinator::Coordinator;
use crate::error::CoordinatorError;
use crate::paths;
use mesh_core::{AgentEvent, AgentEventKind};
use mesh_storage::{append_with_next_seq, read_jsonl_since};

impl Coordinator {
    pub fn append_event(
        &self,
        run_id: &str,
        agent_id: &str,
        kind: AgentEventKind,
    ) -> Result<AgentEvent, CoordinatorError> {
        let path = paths::events_jsonl(&self.root, run_id, agent_id);
        let at_ms = self.clock.now_ms();
        let event = append_with_next_seq(
            &path,
            |e: &AgentEvent| e.seq,
            |seq| AgentEvent { seq, at_ms, kind },
        )?;
        Ok(event)
    }

    pub fn read_events(
        &self,
        run_id: &str,
        agent_id: &str,
        since_seq: u64,
    ) -> Result<Vec<AgentEvent>, CoordinatorError> {
        let path = paths::events_jsonl(&self.root, run_id, agent_id);
        let mut events: Vec<AgentEvent> = read_jsonl_since(&path, since_seq, |e| e.seq)?;
        events.sort_by_key(|e| e.seq);
        Ok(events)
    }
}

#[cfg(test)]
#[path = "event_ops_tests.rs"]
mod tests;
