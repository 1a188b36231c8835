// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent entity: a child of a run, executed by a worker process, plus its
//! append-only event log record types.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for an agent, unique within its owning run.
    pub struct AgentId;
}

/// Per-agent execution limits, all optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentLimits {
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub max_turns: Option<u32>,
}

/// Lifecycle status of an agent. Transitions are validated by the
/// coordinator's `UpdateState` operation against [`AgentStatus::can_transition_to`],
/// which rejects any transition that would move backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl AgentStatus {
    /// Ordinal position in the state-machine order: pending < running <
    /// {completed, failed, cancelled}. Terminal states do not order amongst
    /// each other but all outrank the non-terminal ones.
    fn rank(self) -> u8 {
        match self {
            AgentStatus::Pending => 0,
            AgentStatus::Running => 1,
            AgentStatus::Completed | AgentStatus::Failed | AgentStatus::Cancelled => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 2
    }

    /// Whether moving from `self` to `next` is a forward (or same-state,
    /// idempotent) transition. Terminal-to-terminal transitions are
    /// rejected even though both rank 2, since a completed agent must never
    /// silently become failed or vice versa.
    pub fn can_transition_to(self, next: AgentStatus) -> bool {
        if self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        next.rank() >= self.rank()
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AgentStatus::Pending => "pending",
            AgentStatus::Running => "running",
            AgentStatus::Completed => "completed",
            AgentStatus::Failed => "failed",
            AgentStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// Spec record (`spec.json`): immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSpec {
    pub id: AgentId,
    pub task: String,
    #[serde(default)]
    pub limits: AgentLimits,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub hidden: bool,
}

/// State record (`state.json`): mutated throughout the agent's lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub status: AgentStatus,
    pub started_at_ms: Option<u64>,
    pub updated_at_ms: u64,
    pub finished_at_ms: Option<u64>,
    pub pid: Option<u32>,
    pub error: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    /// Sequence number of the last mailbox message drained ahead of a model
    /// call; advanced by the coordinator's drain operation, never by the
    /// worker directly.
    #[serde(default)]
    pub mailbox_cursor: u64,
}

impl Agent {
    pub fn pending(id: AgentId, now_ms: u64) -> Self {
        Self {
            id,
            status: AgentStatus::Pending,
            started_at_ms: None,
            updated_at_ms: now_ms,
            finished_at_ms: None,
            pid: None,
            error: None,
            hidden: false,
            mailbox_cursor: 0,
        }
    }

    /// Whether a heartbeat at `self.updated_at_ms` is stale relative to
    /// `now_ms`, given `staleness_threshold_ms`.
    pub fn is_stale(&self, now_ms: u64, staleness_threshold_ms: u64) -> bool {
        self.status == AgentStatus::Running
            && now_ms.saturating_sub(self.updated_at_ms) > staleness_threshold_ms
    }
}

/// A single tool-call lifecycle record, external message, or status
/// transition appended to `events.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEventKind {
    ToolStart {
        name: String,
        argument_preview: String,
    },
    ToolDone {
        name: String,
        duration_ms: u64,
        result_preview: String,
        error_preview: Option<String>,
    },
    Message {
        seq: u64,
        role: String,
        preview: String,
    },
    StatusChanged {
        from: AgentStatus,
        to: AgentStatus,
    },
    Signal {
        name: String,
        seq: u64,
    },
}

/// Envelope around an [`AgentEventKind`] carrying its own monotonic sequence
/// number so consumers can poll by sequence cursor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentEvent {
    pub seq: u64,
    pub at_ms: u64,
    pub kind: AgentEventKind,
}

/// Length cap (chars) for tool argument/result previews: one consistent
/// value per log kind. Separate from the general failure-message
/// preview in [`crate::error::DEFAULT_PREVIEW_CHARS`] because tool previews
/// are shown inline, multiple per line, in event listings.
pub const TOOL_PREVIEW_CHARS: usize = 240;

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
