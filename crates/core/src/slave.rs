// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slave identity: stable routing key, display name, version, capabilities,
//! and an opaque metadata bag.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_id! {
    /// Stable routing key for a worker node. Either caller-supplied or
    /// generated once and persisted to a per-user config path.
    pub struct SlaveId;
}

/// Free-form metadata describing a slave's environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SlaveMetadata {
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Identity of a slave node, stable across reconnects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlaveIdentity {
    pub id: SlaveId,
    pub display_name: String,
    pub version: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub metadata: SlaveMetadata,
}

impl SlaveIdentity {
    pub fn new(id: impl Into<SlaveId>, display_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            version: version.into(),
            capabilities: Vec::new(),
            metadata: SlaveMetadata::default(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_metadata(mut self, metadata: SlaveMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
#[path = "slave_tests.rs"]
mod tests;
