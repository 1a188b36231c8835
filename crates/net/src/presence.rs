// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Presence-store abstraction: an advisory, possibly-shared record of which
//! slaves are online, independent of the in-process registry a single
//! master instance keeps. A no-op implementation is the default; a
//! Redis-backed one lets multiple master instances share presence.

use async_trait::async_trait;
use mesh_core::PresenceRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("presence backend unavailable: {0}")]
    Backend(String),
}

/// A presence backend. `set` must fail closed: if the write cannot be
/// confirmed, callers should treat the slave as not authoritatively
/// present rather than assuming success.
#[async_trait]
pub trait PresenceStore: Send + Sync {
    async fn set(&self, record: &PresenceRecord, ttl_secs: u64) -> Result<(), PresenceError>;
    async fn get(&self, slave_id: &str) -> Result<Option<PresenceRecord>, PresenceError>;
    async fn remove(&self, slave_id: &str) -> Result<(), PresenceError>;
}

/// Presence store that does nothing: used when only a single master
/// instance is running and the in-memory registry is fully authoritative.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPresenceStore;

#[async_trait]
impl PresenceStore for NoopPresenceStore {
    async fn set(&self, _record: &PresenceRecord, _ttl_secs: u64) -> Result<(), PresenceError> {
        Ok(())
    }

    async fn get(&self, _slave_id: &str) -> Result<Option<PresenceRecord>, PresenceError> {
        Ok(None)
    }

    async fn remove(&self, _slave_id: &str) -> Result<(), PresenceError> {
        Ok(())
    }
}

/// Redis-backed presence store for multi-instance masters. Records are
/// stored as JSON strings under `presence:<slave_id>` with a `SET ... EX`
/// expiry; a `set` that the server does not acknowledge is surfaced as an
/// error rather than silently assumed to have landed.
pub struct RedisPresenceStore {
    manager: redis::aio::ConnectionManager,
}

impl RedisPresenceStore {
    pub async fn connect(url: &str) -> Result<Self, PresenceError> {
        let client = redis::Client::open(url).map_err(|e| PresenceError::Backend(e.to_string()))?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| PresenceError::Backend(e.to_string()))?;
        Ok(Self { manager })
    }

    fn key(slave_id: &str) -> String {
        format!("presence:{slave_id}")
    }
}

#[async_trait]
impl PresenceStore for RedisPresenceStore {
    async fn set(&self, record: &PresenceRecord, ttl_secs: u64) -> Result<(), PresenceError> {
        let payload =
            serde_json::to_string(record).map_err(|e| PresenceError::Backend(e.to_string()))?;
        let mut conn = self.manager.clone();
        redis::cmd("SET")
            .arg(Self::key(&record.slave_id))
            .arg(payload)
            .arg("EX")
            .arg(ttl_secs)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| PresenceError::Backend(e.to_string()))
    }

    async fn get(&self, slave_id: &str) -> Result<Option<PresenceRecord>, PresenceError> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = redis::cmd("GET")
            .arg(Self::key(slave_id))
            .query_async(&mut conn)
            .await
            .map_err(|e| PresenceError::Backend(e.to_string()))?;
        match raw {
            Some(s) => serde_json::from_str(&s)
                .map(Some)
                .map_err(|e| PresenceError::Backend(e.to_string())),
            None => Ok(None),
        }
    }

    async fn remove(&self, slave_id: &str) -> Result<(), PresenceError> {
        let mut conn = self.manager.clone();
        redis::cmd("DEL")
            .arg(Self::key(slave_id))
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| PresenceError::Backend(e.to_string()))
    }
}

#[cfg(test)]
#[path = "presence_tests.rs"]
mod tests;
