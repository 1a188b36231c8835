// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory slave registry: the master's authoritative view of which
//! slaves are connected to this instance, protected by a single `RwLock`.
//! Reads hand out channel-free snapshots only -- never a live entry -- so
//! callers can't accidentally hold a lock across an `.await`.

use mesh_core::{RegistryEntry, RegistrySnapshot, RegistryStatus, SlaveIdentity};
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::connection::ConnectionHandle;

/// Outcome of registering a new connection for a slave id.
pub struct UpsertOutcome {
    /// The previous connection for this slave id, if one was live. The
    /// caller is responsible for draining then force-closing it -- the
    /// registry only displaces the registry-side reference.
    pub displaced: Option<ConnectionHandle>,
}

#[derive(Default)]
pub struct SlaveRegistry {
    entries: RwLock<HashMap<String, RegistryEntry<ConnectionHandle>>>,
}

impl SlaveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `connection` as the live channel for `identity.id`. If a
    /// connection was already live for this slave id, it is replaced and
    /// returned as `displaced` -- newer connection wins, older one must be
    /// drained and force-closed by the caller.
    pub fn upsert(
        &self,
        identity: SlaveIdentity,
        gateway_instance_id: &str,
        connection: ConnectionHandle,
        now: u64,
    ) -> UpsertOutcome {
        let mut entries = self.entries.write();
        let key = identity.id.as_str().to_string();

        let displaced = entries.get_mut(&key).and_then(|entry| entry.channel.take());

        let mut entry = RegistryEntry::new(identity, gateway_instance_id, now);
        entry.status = RegistryStatus::Online;
        entry.channel = Some(connection);
        entries.insert(key, entry);

        UpsertOutcome { displaced }
    }

    /// Mark a slave offline without removing its directory entry, so its
    /// last-known metadata stays visible to listings until it reconnects
    /// or is explicitly forgotten.
    pub fn mark_offline(&self, slave_id: &str, now: u64) {
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get_mut(slave_id) {
            entry.status = RegistryStatus::Offline;
            entry.channel = None;
            entry.last_seen_secs = now;
        }
    }

    pub fn touch(&self, slave_id: &str, now: u64) {
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get_mut(slave_id) {
            entry.last_seen_secs = now;
        }
    }

    /// Remove a slave's directory entry entirely.
    pub fn forget(&self, slave_id: &str) -> bool {
        self.entries.write().remove(slave_id).is_some()
    }

    pub fn snapshot(&self) -> Vec<RegistrySnapshot> {
        self.entries.read().values().map(|e| e.snapshot()).collect()
    }

    pub fn snapshot_one(&self, slave_id: &str) -> Option<RegistrySnapshot> {
        self.entries.read().get(slave_id).map(|e| e.snapshot())
    }

    /// Send an envelope to a slave's live connection. Returns `false` if
    /// the slave is not currently online.
    pub fn send_to(&self, slave_id: &str, envelope: mesh_core::Envelope) -> bool {
        let entries = self.entries.read();
        match entries.get(slave_id) {
            Some(entry) if entry.is_online() => {
                let Some(channel) = entry.channel.as_ref() else {
                    return false;
                };
                channel.send(envelope).is_ok()
            }
            _ => false,
        }
    }

    pub fn is_online(&self, slave_id: &str) -> bool {
        self.entries
            .read()
            .get(slave_id)
            .is_some_and(|e| e.is_online())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
