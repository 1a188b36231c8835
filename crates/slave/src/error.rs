// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The slave client's error seam.

use mesh_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlaveClientError {
    #[error("failed to dial master: {0}")]
    Dial(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("tls configuration error: {0}")]
    Tls(#[from] mesh_net::TlsError),

    #[error("auth signing error: {0}")]
    Auth(#[from] mesh_net::AuthError),

    #[error("wire error: {0}")]
    Wire(#[from] mesh_net::WireError),

    #[error("registration rejected: {reason}")]
    RegistrationRejected { reason: String },

    #[error("registration timed out")]
    RegistrationTimeout,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SlaveClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SlaveClientError::RegistrationRejected { .. } => ErrorKind::AuthFailed,
            SlaveClientError::RegistrationTimeout => ErrorKind::Timeout,
            SlaveClientError::Dial(_) | SlaveClientError::Wire(_) => ErrorKind::Offline,
            SlaveClientError::Tls(_) | SlaveClientError::Auth(_) => ErrorKind::ProtocolError,
            SlaveClientError::Io(_) => ErrorKind::IoError,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
