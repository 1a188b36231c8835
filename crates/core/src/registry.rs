// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry entry: what the master holds in-memory for each known slave.
//! The channel handle itself is generic (`H`) so this type can be
//! shared between production code (a real connection handle) and tests (a
//! unit/fake handle) without the core crate depending on the transport.

use crate::slave::SlaveIdentity;
use serde::{Deserialize, Serialize};

/// Online/offline status of a registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryStatus {
    Online,
    Offline,
}

/// A known slave's directory entry, as held by the master.
///
/// `channel` is `Some` only while `status == Online`; the invariant that at
/// most one entry has an active channel for a given slave id is enforced by
/// the registry that owns these entries, not by this struct.
#[derive(Debug, Clone)]
pub struct RegistryEntry<H> {
    pub identity: SlaveIdentity,
    pub status: RegistryStatus,
    pub last_seen_secs: u64,
    pub gateway_instance_id: String,
    pub channel: Option<H>,
    pub in_flight: u32,
}

impl<H> RegistryEntry<H> {
    pub fn new(identity: SlaveIdentity, gateway_instance_id: impl Into<String>, now: u64) -> Self {
        Self {
            identity,
            status: RegistryStatus::Offline,
            last_seen_secs: now,
            gateway_instance_id: gateway_instance_id.into(),
            channel: None,
            in_flight: 0,
        }
    }

    pub fn is_online(&self) -> bool {
        self.status == RegistryStatus::Online && self.channel.is_some()
    }

    /// A cloneable, channel-free snapshot safe to hand to callers. The
    /// registry never hands out mutable references to its live entries.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            identity: self.identity.clone(),
            status: self.status,
            last_seen_secs: self.last_seen_secs,
            in_flight: self.in_flight,
        }
    }
}

/// An owned, channel-free copy of a registry entry for read-only consumers
/// (UI, CLI listing).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistrySnapshot {
    pub identity: SlaveIdentity,
    pub status: RegistryStatus,
    pub last_seen_secs: u64,
    pub in_flight: u32,
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
