// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The master's websocket gateway: one axum handler per slave connection,
//! taking it through `NEW -> CONNECTED -> AUTHENTICATED -> LIVE`, plus the
//! pending-reply slot map and event-stream fan-out used by callers
//! dispatching an `agent.run` and waiting on its terminal result while
//! also observing its streamed `agent.event` frames.

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use mesh_core::{
    presence_ttl_secs, Clock, Envelope, EnvelopeKind, ErrorKind, PresenceRecord, SlaveIdentity,
    SlaveMetadata, DEFAULT_MAX_FRAME_BYTES,
};
use mesh_net::{handle_get_request, handle_put_chunk, ChunkReceiver, ChunkSender, NonceCache, PresenceStore};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Instant};
use tokio_util::sync::CancellationToken;

use crate::connection::ConnectionHandle;
use crate::registry::SlaveRegistry;
use crate::secret::GatewaySecret;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("slave {0} is offline")]
    Offline(String),
    #[error("request timed out waiting for a reply")]
    Timeout,
    #[error("slave reported failure: {0}")]
    Remote(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("request was cancelled")]
    Cancelled,
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Offline(_) => ErrorKind::Offline,
            GatewayError::Timeout => ErrorKind::Timeout,
            GatewayError::Remote(_) => ErrorKind::RemoteError,
            GatewayError::Protocol(_) => ErrorKind::ProtocolError,
            GatewayError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

/// Terminal outcome of a dispatched `agent.run`.
#[derive(Debug, Clone)]
pub struct AgentRunOutcome {
    pub status: String,
    pub output: Option<String>,
    pub run_id: Option<String>,
    pub error: Option<String>,
}

struct PendingSlot {
    reply: oneshot::Sender<Envelope>,
}

#[derive(Default)]
struct Subscribers {
    by_request_id: HashMap<String, Vec<mpsc::UnboundedSender<Value>>>,
}

pub struct MasterGatewayConfig {
    pub heartbeat_interval_secs: u64,
    pub registration_timeout: Duration,
    pub default_run_timeout: Duration,
    pub max_frame_bytes: usize,
    pub server_instance_id: String,
    /// Directory a slave-initiated `file.put`/`file.get` is sandboxed to.
    /// `None` rejects every inbound transfer request.
    pub file_root: Option<PathBuf>,
    /// Deadline for a single chunk round-trip on a master-initiated
    /// [`MasterGateway::put_file`]/[`MasterGateway::get_file`] call.
    pub transfer_chunk_timeout: Duration,
}

impl Default for MasterGatewayConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: 20,
            registration_timeout: Duration::from_secs(10),
            default_run_timeout: Duration::from_secs(300),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            server_instance_id: uuid::Uuid::new_v4().to_string(),
            file_root: None,
            transfer_chunk_timeout: Duration::from_secs(60),
        }
    }
}

/// Shared state behind the websocket handler. Cheap to clone (an `Arc`
/// internally) so it can be handed to axum as router state.
#[derive(Clone)]
pub struct MasterGateway {
    inner: Arc<Inner>,
}

struct Inner {
    registry: SlaveRegistry,
    secret: GatewaySecret,
    nonce_cache: NonceCache,
    clock: Arc<dyn Clock>,
    presence: Arc<dyn PresenceStore>,
    pending: Mutex<HashMap<String, PendingSlot>>,
    subscribers: Mutex<Subscribers>,
    transfer_chunks: Mutex<HashMap<String, mpsc::UnboundedSender<EnvelopeKind>>>,
    put_receivers: Mutex<HashMap<String, ChunkReceiver>>,
    config: MasterGatewayConfig,
}

impl MasterGateway {
    pub fn new(secret: GatewaySecret, clock: Arc<dyn Clock>, config: MasterGatewayConfig) -> Self {
        Self::with_presence(secret, clock, Arc::new(mesh_net::NoopPresenceStore), config)
    }

    /// Like [`Self::new`], but with an explicit presence backend --
    /// `redis_url` configured deployments use [`mesh_net::RedisPresenceStore`]
    /// so presence is visible across multiple master instances.
    pub fn with_presence(
        secret: GatewaySecret,
        clock: Arc<dyn Clock>,
        presence: Arc<dyn PresenceStore>,
        config: MasterGatewayConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: SlaveRegistry::new(),
                secret,
                nonce_cache: NonceCache::new(),
                clock,
                presence,
                pending: Mutex::new(HashMap::new()),
                subscribers: Mutex::new(Subscribers::default()),
                transfer_chunks: Mutex::new(HashMap::new()),
                put_receivers: Mutex::new(HashMap::new()),
                config,
            }),
        }
    }

    pub fn registry(&self) -> &SlaveRegistry {
        &self.inner.registry
    }

    /// Subscribe to streamed `agent.event` payloads for an in-flight
    /// request id. The receiver yields events until the matching terminal
    /// result arrives and the subscriber list for that id is cleared.
    pub fn subscribe_events(&self, request_id: &str) -> mpsc::UnboundedReceiver<Value> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .subscribers
            .lock()
            .by_request_id
            .entry(request_id.to_string())
            .or_default()
            .push(tx);
        rx
    }

    /// Send an `agent.run` to `slave_id` and wait for its terminal
    /// `agent.result`, up to `timeout_override` (or the configured
    /// default) or until `cancel` fires, whichever comes first. Streamed
    /// events, if anyone subscribed via [`Self::subscribe_events`], are
    /// delivered independently of this call.
    ///
    /// When `cancel` fires before a terminal reply arrives, the slave is
    /// sent an `agent.cancel` for the same request id and the wait
    /// continues up to the original deadline, giving it a chance to reply
    /// with its own `status = "cancelled"` result rather than the call
    /// simply erroring out.
    pub async fn dispatch_run(
        &self,
        slave_id: &str,
        task: String,
        options: Value,
        metadata: Value,
        timeout_override: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<AgentRunOutcome, GatewayError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let (tx, mut rx) = oneshot::channel();
        self.inner
            .pending
            .lock()
            .insert(request_id.clone(), PendingSlot { reply: tx });

        let envelope = Envelope::new(
            request_id.clone(),
            self.inner.clock.now_secs(),
            EnvelopeKind::AgentRun { task, options, metadata },
        );

        if !self.inner.registry.send_to(slave_id, envelope) {
            self.inner.pending.lock().remove(&request_id);
            return Err(GatewayError::Offline(slave_id.to_string()));
        }

        let wait = timeout_override.unwrap_or(self.inner.config.default_run_timeout);
        let deadline = Instant::now() + wait;
        let mut cancel_sent = false;

        let result = loop {
            tokio::select! {
                reply = &mut rx => break reply,
                () = tokio::time::sleep_until(deadline) => {
                    self.inner.pending.lock().remove(&request_id);
                    self.inner.subscribers.lock().by_request_id.remove(&request_id);
                    return Err(GatewayError::Timeout);
                }
                _ = cancel.cancelled(), if !cancel_sent => {
                    cancel_sent = true;
                    let _ = self.cancel_run(slave_id, &request_id);
                }
            }
        };
        self.inner.pending.lock().remove(&request_id);
        self.inner.subscribers.lock().by_request_id.remove(&request_id);

        let envelope = match result {
            Ok(envelope) => envelope,
            Err(_) => return Err(GatewayError::Protocol("reply channel dropped".into())),
        };

        match envelope.kind {
            EnvelopeKind::AgentResult { status, output, run_id, error } => {
                Ok(AgentRunOutcome { status, output, run_id, error })
            }
            EnvelopeKind::Error { message, .. } => Err(GatewayError::Remote(message)),
            _ => Err(GatewayError::Protocol("unexpected reply kind".into())),
        }
    }

    /// Ask `slave_id` to cancel the in-flight run identified by
    /// `request_id`, reusing the request id so the slave can match it to
    /// the cancellation token it tracks for that run.
    pub fn cancel_run(&self, slave_id: &str, request_id: &str) -> Result<(), GatewayError> {
        let envelope = Envelope::new(request_id.to_string(), self.inner.clock.now_secs(), EnvelopeKind::AgentCancel);
        if self.inner.registry.send_to(slave_id, envelope) {
            Ok(())
        } else {
            Err(GatewayError::Offline(slave_id.to_string()))
        }
    }

    /// Push a whole file to `slave_id` at `path` (relative to its configured
    /// transfer root), chunked, waiting for an ack after each chunk and
    /// aborting on the first negative one or `cancel` firing.
    pub async fn put_file(
        &self,
        slave_id: &str,
        path: String,
        data: Vec<u8>,
        cancel: &CancellationToken,
    ) -> Result<(), GatewayError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let (tx, mut acks) = mpsc::unbounded_channel();
        self.inner.transfer_chunks.lock().insert(request_id.clone(), tx);

        let mut sender = ChunkSender::new(&data);
        let result = 'chunks: loop {
            let Some(chunk) = sender.next_chunk() else { break Ok(()) };
            let envelope = Envelope::new(
                request_id.clone(),
                self.inner.clock.now_secs(),
                EnvelopeKind::FilePutRequest {
                    path: path.clone(),
                    offset: chunk.offset,
                    size: chunk.size,
                    end: chunk.end,
                    digest: chunk.digest,
                    data: chunk.data_b64,
                },
            );
            if !self.inner.registry.send_to(slave_id, envelope) {
                break Err(GatewayError::Offline(slave_id.to_string()));
            }

            let ack = tokio::select! {
                ack = acks.recv() => ack,
                () = tokio::time::sleep(self.inner.config.transfer_chunk_timeout) => break 'chunks Err(GatewayError::Timeout),
                _ = cancel.cancelled() => break 'chunks Err(GatewayError::Cancelled),
            };
            match ack {
                Some(EnvelopeKind::FilePutResponse { ok: true, .. }) => {}
                Some(EnvelopeKind::FilePutResponse { ok: false, reason }) => {
                    break Err(GatewayError::Remote(reason.unwrap_or_else(|| "put rejected".to_string())));
                }
                _ => break Err(GatewayError::Protocol("unexpected transfer reply".to_string())),
            }
        };

        self.inner.transfer_chunks.lock().remove(&request_id);
        result
    }

    /// Pull a whole file back from `slave_id` at `path` (relative to its
    /// configured transfer root), reassembling and digest-verifying the
    /// chunked reply.
    pub async fn get_file(
        &self,
        slave_id: &str,
        path: String,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, GatewayError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let (tx, mut chunks) = mpsc::unbounded_channel();
        self.inner.transfer_chunks.lock().insert(request_id.clone(), tx);

        let envelope = Envelope::new(request_id.clone(), self.inner.clock.now_secs(), EnvelopeKind::FileGetRequest { path });
        let result = if !self.inner.registry.send_to(slave_id, envelope) {
            Err(GatewayError::Offline(slave_id.to_string()))
        } else {
            let mut receiver = ChunkReceiver::new();
            loop {
                let frame = tokio::select! {
                    frame = chunks.recv() => frame,
                    () = tokio::time::sleep(self.inner.config.transfer_chunk_timeout) => break Err(GatewayError::Timeout),
                    _ = cancel.cancelled() => break Err(GatewayError::Cancelled),
                };
                match frame {
                    Some(EnvelopeKind::FileGetResponse { ok: false, reason, .. }) => {
                        break Err(GatewayError::Remote(reason.unwrap_or_else(|| "get rejected".to_string())));
                    }
                    Some(EnvelopeKind::FileGetResponse { offset, end, digest, data, ok: true, .. }) => {
                        match receiver.accept_chunk(offset, &data, end, digest.as_deref()) {
                            Ok(Some(bytes)) => break Ok(bytes),
                            Ok(None) => continue,
                            Err(e) => break Err(GatewayError::Protocol(e.to_string())),
                        }
                    }
                    _ => break Err(GatewayError::Protocol("unexpected transfer reply".to_string())),
                }
            }
        };

        self.inner.transfer_chunks.lock().remove(&request_id);
        result
    }

    /// Dispatch handling for one decoded inbound envelope from `slave_id`.
    fn handle_incoming(&self, slave_id: &str, envelope: Envelope) {
        match envelope.kind {
            EnvelopeKind::AgentResult { .. } | EnvelopeKind::Error { .. } => {
                if let Some(slot) = self.inner.pending.lock().remove(&envelope.request_id) {
                    let _ = slot.reply.send(envelope);
                }
            }
            EnvelopeKind::AgentEvent { ref event } => {
                let mut subs = self.inner.subscribers.lock();
                if let Some(senders) = subs.by_request_id.get_mut(&envelope.request_id) {
                    senders.retain(|tx| tx.send(event.clone()).is_ok());
                }
            }
            EnvelopeKind::Heartbeat => {
                self.inner.registry.touch(slave_id, self.inner.clock.now_secs());
                let ack = Envelope::new(
                    envelope.request_id,
                    self.inner.clock.now_secs(),
                    EnvelopeKind::HeartbeatAck,
                );
                let _ = self.inner.registry.send_to(slave_id, ack);
            }
            EnvelopeKind::FilePutResponse { .. } | EnvelopeKind::FileGetResponse { .. } => {
                if let Some(tx) = self.inner.transfer_chunks.lock().get(&envelope.request_id) {
                    let _ = tx.send(envelope.kind);
                }
            }
            EnvelopeKind::FilePutRequest { path, offset, size: _, end, digest, data } => {
                let reply_kind = handle_put_chunk(
                    self.inner.config.file_root.as_deref(),
                    &mut self.inner.put_receivers.lock(),
                    &envelope.request_id,
                    &path,
                    offset,
                    &data,
                    end,
                    digest.as_deref(),
                );
                let reply = Envelope::new(envelope.request_id, self.inner.clock.now_secs(), reply_kind);
                let _ = self.inner.registry.send_to(slave_id, reply);
            }
            EnvelopeKind::FileGetRequest { path } => {
                let now = self.inner.clock.now_secs();
                for kind in handle_get_request(self.inner.config.file_root.as_deref(), &path) {
                    let reply = Envelope::new(envelope.request_id.clone(), now, kind);
                    if !self.inner.registry.send_to(slave_id, reply) {
                        break;
                    }
                }
            }
            _ => {
                tracing::debug!(kind = envelope.kind.tag(), "ignoring unexpected inbound frame");
            }
        }
    }

    /// Drive one accepted websocket connection through registration and
    /// into its live read/write loop. Called from the axum upgrade
    /// handler.
    pub async fn handle_socket(self, socket: WebSocket) {
        let (mut sink, mut stream) = socket.split();
        let max_bytes = self.inner.config.max_frame_bytes;

        let register_result = timeout(self.inner.config.registration_timeout, async {
            loop {
                let msg = stream.next().await?.ok()?;
                if let Some(envelope) = decode_axum_message(msg, max_bytes) {
                    return Some(envelope);
                }
            }
        })
        .await;

        let Ok(Some(envelope)) = register_result else {
            let _ = sink.close().await;
            return;
        };

        let EnvelopeKind::Register {
            slave_id,
            display_name,
            version,
            capabilities,
            metadata,
            nonce,
            timestamp,
            signature,
        } = envelope.kind
        else {
            let _ = send_error(&mut sink, &envelope.request_id, ErrorKind::ProtocolError, "expected register", self.inner.clock.now_secs(), max_bytes).await;
            let _ = sink.close().await;
            return;
        };

        let now = self.inner.clock.now_secs();
        let auth_ok = mesh_net::verify_register(
            self.inner.secret.as_bytes(),
            &slave_id,
            &display_name,
            &version,
            &nonce,
            timestamp,
            &signature,
            now,
        )
        .is_ok()
            && self.inner.nonce_cache.check_and_insert(&nonce, now).is_ok();

        if !auth_ok {
            let _ = send_error(&mut sink, &envelope.request_id, ErrorKind::AuthFailed, "registration rejected", now, max_bytes).await;
            let _ = sink.close().await;
            return;
        }

        let meta: SlaveMetadata = serde_json::from_value(metadata).unwrap_or_default();
        let identity_display_name = display_name.clone();
        let identity = SlaveIdentity::new(slave_id.clone(), display_name, version)
            .with_capabilities(capabilities)
            .with_metadata(meta);

        let connection_id = uuid::Uuid::new_v4().to_string();
        let (handle, mut outbound_rx, close_requested, cancel) = ConnectionHandle::new(connection_id);
        let outcome = self.inner.registry.upsert(identity, &self.inner.config.server_instance_id, handle, now);
        if let Some(displaced) = outcome.displaced {
            // Give the old connection a chance to observe a close frame and
            // drain before force-cancelling it; run it off to the side so
            // registering the new connection never blocks on it.
            tokio::spawn(async move { displaced.close_gracefully().await });
        }

        let ack = Envelope::new(
            envelope.request_id,
            now,
            EnvelopeKind::RegisterAck {
                accepted: true,
                reason: None,
                heartbeat_interval_secs: Some(self.inner.config.heartbeat_interval_secs),
                server_instance_id: Some(self.inner.config.server_instance_id.clone()),
            },
        );
        if sink.send(encode_axum_message(&ack, max_bytes)).await.is_err() {
            self.inner.registry.mark_offline(&slave_id, now);
            return;
        }

        let presence_ttl = presence_ttl_secs(self.inner.config.heartbeat_interval_secs);
        if let Err(e) = self
            .inner
            .presence
            .set(&PresenceRecord::online(&slave_id, &identity_display_name, now), presence_ttl)
            .await
        {
            tracing::warn!(slave_id = %slave_id, error = %e, "failed to publish presence");
        }

        let heartbeat_timeout = Duration::from_secs(self.inner.config.heartbeat_interval_secs.saturating_mul(3).max(1));
        let mut heartbeat_deadline = Instant::now() + heartbeat_timeout;
        let mut close_frame_sent = false;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = close_requested.cancelled(), if !close_frame_sent => {
                    close_frame_sent = true;
                    let _ = sink.send(Message::Close(None)).await;
                }
                () = tokio::time::sleep_until(heartbeat_deadline) => {
                    tracing::warn!(slave_id = %slave_id, "no heartbeat within 3x the agreed interval, closing connection");
                    break;
                }
                outgoing = outbound_rx.recv() => {
                    match outgoing {
                        Some(envelope) => {
                            if sink.send(encode_axum_message(&envelope, max_bytes)).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                incoming = stream.next() => {
                    match incoming {
                        Some(Ok(msg)) => {
                            if let Some(envelope) = decode_axum_message(msg, max_bytes) {
                                if matches!(envelope.kind, EnvelopeKind::Heartbeat) {
                                    heartbeat_deadline = Instant::now() + heartbeat_timeout;
                                }
                                self.handle_incoming(&slave_id, envelope);
                            }
                        }
                        _ => break,
                    }
                }
            }
        }

        self.inner.registry.mark_offline(&slave_id, self.inner.clock.now_secs());
        if let Err(e) = self.inner.presence.remove(&slave_id).await {
            tracing::warn!(slave_id = %slave_id, error = %e, "failed to clear presence");
        }
        let _ = sink.close().await;
    }
}

fn decode_axum_message(msg: Message, max_bytes: usize) -> Option<Envelope> {
    match msg {
        Message::Binary(bytes) => Envelope::decode(&bytes, max_bytes).ok(),
        Message::Text(text) => Envelope::decode(text.as_bytes(), max_bytes).ok(),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) => None,
    }
}

fn encode_axum_message(envelope: &Envelope, max_bytes: usize) -> Message {
    match envelope.encode(max_bytes) {
        Ok(bytes) => Message::Binary(bytes.into()),
        Err(_) => Message::Close(None),
    }
}

async fn send_error(
    sink: &mut SplitSink<WebSocket, Message>,
    request_id: &str,
    kind: ErrorKind,
    message: &str,
    now: u64,
    max_bytes: usize,
) -> Result<(), ()> {
    let envelope = Envelope::new(request_id.to_string(), now, EnvelopeKind::Error { kind, message: message.to_string() });
    sink.send(encode_axum_message(&envelope, max_bytes)).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
