// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Envelope framing over a websocket connection.
//!
//! A websocket already delimits message boundaries, so unlike a raw TCP
//! byte stream this carries no length prefix of its own -- each binary
//! frame is exactly one encoded [`Envelope`]. Oversize frames are rejected
//! by [`mesh_core::Envelope::decode`] before JSON parsing is attempted.

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use mesh_core::{Envelope, EnvelopeError};
use thiserror::Error;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),
    #[error("websocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("connection closed")]
    Closed,
}

/// Read one envelope from a websocket stream, skipping ping/pong/close
/// control frames transparently. Returns [`WireError::Closed`] once the
/// peer's stream ends.
pub async fn read_envelope<S>(ws: &mut S, max_bytes: usize) -> Result<Envelope, WireError>
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let msg = ws.next().await.ok_or(WireError::Closed)??;
        match msg {
            Message::Binary(bytes) => return Ok(Envelope::decode(&bytes, max_bytes)?),
            Message::Text(text) => return Ok(Envelope::decode(text.as_bytes(), max_bytes)?),
            Message::Close(_) => return Err(WireError::Closed),
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
        }
    }
}

/// Encode and write one envelope as a single binary websocket frame.
pub async fn write_envelope<S>(
    ws: &mut S,
    envelope: &Envelope,
    max_bytes: usize,
) -> Result<(), WireError>
where
    S: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let bytes = envelope.encode(max_bytes)?;
    ws.send(Message::Binary(bytes.into())).await?;
    Ok(())
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
