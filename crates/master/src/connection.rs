// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handle to one live slave connection: an outbound envelope queue plus a
//! cancellation token the registry can use to force-close a displaced
//! connection after giving it a chance to drain.

use mesh_core::Envelope;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Bounded interval a displaced connection is given to observe a close
/// frame and drain before it is force-cancelled.
pub const GRACEFUL_CLOSE_DRAIN: Duration = Duration::from_secs(2);

/// Cloneable handle to a connection's writer task. Dropping every clone
/// does not close the connection by itself -- only `close()`,
/// `close_gracefully()`, or the writer task observing the channel close
/// does.
#[derive(Clone)]
pub struct ConnectionHandle {
    pub connection_id: String,
    outbound: mpsc::UnboundedSender<Envelope>,
    close_requested: CancellationToken,
    cancel: CancellationToken,
}

impl ConnectionHandle {
    pub fn new(
        connection_id: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<Envelope>, CancellationToken, CancellationToken) {
        let (tx, rx) = mpsc::unbounded_channel();
        let close_requested = CancellationToken::new();
        let cancel = CancellationToken::new();
        (
            Self {
                connection_id: connection_id.into(),
                outbound: tx,
                close_requested: close_requested.clone(),
                cancel: cancel.clone(),
            },
            rx,
            close_requested,
            cancel,
        )
    }

    /// Queue an envelope for the writer task. Fails only once the writer
    /// task has exited and dropped its receiver.
    pub fn send(&self, envelope: Envelope) -> Result<(), mpsc::error::SendError<Envelope>> {
        self.outbound.send(envelope)
    }

    /// Immediately force the connection's reader/writer tasks to stop,
    /// with no close frame and no drain period.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Ask the connection to send a close frame and give it
    /// [`GRACEFUL_CLOSE_DRAIN`] to observe it before force-cancelling.
    /// Used when a newer connection for the same slave id displaces this
    /// one. Awaits the drain period, so callers that must not block on it
    /// should run this in its own task.
    pub async fn close_gracefully(&self) {
        self.close_requested.cancel();
        tokio::time::sleep(GRACEFUL_CLOSE_DRAIN).await;
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
