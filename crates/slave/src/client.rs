// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The slave client: dial loop, registration handshake, heartbeats, and
//! dispatch of inbound `agent.run`/`agent.cancel` frames to a pluggable
//! [`AgentRunHandler`].

use crate::backoff::Backoff;
use crate::error::SlaveClientError;
use crate::handler::AgentRunHandler;
use crate::inflight::InflightGate;
use futures_util::StreamExt;
use mesh_core::{Clock, Envelope, EnvelopeKind, SlaveMetadata, DEFAULT_MAX_FRAME_BYTES};
use mesh_net::{client_tls_config, handle_get_request, handle_put_chunk, read_envelope, sign_register, write_envelope, ChunkReceiver};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::Connector;
use tokio_util::sync::CancellationToken;

/// Static configuration for one slave client. Does not change across
/// reconnects -- only the connection itself is retried.
#[derive(Clone)]
pub struct SlaveClientConfig {
    pub master_url: String,
    pub slave_id: String,
    pub display_name: String,
    pub version: String,
    pub capabilities: Vec<String>,
    pub metadata: SlaveMetadata,
    pub secret: Vec<u8>,
    pub insecure_skip_verify: bool,
    pub max_inflight: usize,
    pub max_frame_bytes: usize,
    pub registration_timeout: Duration,
    /// Directory a master-initiated `file.put`/`file.get` is sandboxed to.
    /// `None` rejects every inbound transfer request.
    pub file_root: Option<PathBuf>,
}

impl Default for SlaveClientConfig {
    fn default() -> Self {
        Self {
            master_url: String::new(),
            slave_id: String::new(),
            display_name: String::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            capabilities: Vec::new(),
            metadata: SlaveMetadata::default(),
            secret: Vec::new(),
            insecure_skip_verify: false,
            max_inflight: 1,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            registration_timeout: Duration::from_secs(10),
            file_root: None,
        }
    }
}

/// Why one connection attempt ended, distinguishing a clean local stop
/// from a dropped/rejected connection that should be retried.
enum ConnectionOutcome {
    StopRequested,
    Disconnected,
}

/// Drives a single live connection to a master, reconnecting with backoff
/// until asked to stop.
pub struct SlaveClient<H: AgentRunHandler> {
    config: SlaveClientConfig,
    handler: Arc<H>,
    inflight: Arc<InflightGate>,
    clock: Arc<dyn Clock>,
}

impl<H: AgentRunHandler + 'static> SlaveClient<H> {
    pub fn new(config: SlaveClientConfig, handler: H, clock: Arc<dyn Clock>) -> Self {
        let inflight = Arc::new(InflightGate::new(config.max_inflight.max(1)));
        Self {
            config,
            handler: Arc::new(handler),
            inflight,
            clock,
        }
    }

    /// Run the reconnect loop until `stop` fires. Returns once a clean
    /// stop has been observed; connection errors are logged and retried
    /// rather than propagated.
    pub async fn run(&self, stop: CancellationToken) -> Result<(), SlaveClientError> {
        let mut backoff = Backoff::new();

        while !stop.is_cancelled() {
            let connected_at = Instant::now();
            match self.connect_and_serve(&stop).await {
                Ok(ConnectionOutcome::StopRequested) => return Ok(()),
                Ok(ConnectionOutcome::Disconnected) => {
                    tracing::warn!(slave_id = %self.config.slave_id, "connection to master dropped, will reconnect");
                }
                Err(SlaveClientError::RegistrationRejected { reason }) => {
                    tracing::error!(slave_id = %self.config.slave_id, reason = %reason, "registration rejected terminally, giving up");
                    return Err(SlaveClientError::RegistrationRejected { reason });
                }
                Err(e) => {
                    tracing::warn!(slave_id = %self.config.slave_id, error = %e, "connection attempt failed");
                }
            }

            backoff.note_live_for(connected_at.elapsed());

            if stop.is_cancelled() {
                return Ok(());
            }
            let delay = backoff.next_delay();
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = stop.cancelled() => return Ok(()),
            }
        }
        Ok(())
    }

    async fn connect_and_serve(&self, stop: &CancellationToken) -> Result<ConnectionOutcome, SlaveClientError> {
        let max_bytes = self.config.max_frame_bytes;
        let (mut sink, mut stream) = self.dial().await?.split();

        let nonce = mesh_core::short_token("nonce");
        let timestamp = self.clock.now_secs();
        let signature = sign_register(
            &self.config.secret,
            &self.config.slave_id,
            &self.config.display_name,
            &self.config.version,
            &nonce,
            timestamp,
        )?;

        let register = Envelope::new(
            mesh_core::short_token("req"),
            timestamp,
            EnvelopeKind::Register {
                slave_id: self.config.slave_id.clone(),
                display_name: self.config.display_name.clone(),
                version: self.config.version.clone(),
                capabilities: self.config.capabilities.clone(),
                metadata: serde_json::to_value(&self.config.metadata).unwrap_or(Value::Null),
                nonce,
                timestamp,
                signature,
            },
        );
        write_envelope(&mut sink, &register, max_bytes).await?;

        let ack = tokio::time::timeout(self.config.registration_timeout, read_envelope(&mut stream, max_bytes))
            .await
            .map_err(|_| SlaveClientError::RegistrationTimeout)??;

        let EnvelopeKind::RegisterAck { accepted, reason, heartbeat_interval_secs, .. } = ack.kind else {
            return Err(SlaveClientError::RegistrationRejected {
                reason: "master replied with a non-register_ack frame".to_string(),
            });
        };
        if !accepted {
            return Err(SlaveClientError::RegistrationRejected {
                reason: reason.unwrap_or_else(|| "rejected".to_string()),
            });
        }
        let heartbeat_interval = Duration::from_secs(heartbeat_interval_secs.unwrap_or(20));

        tracing::info!(slave_id = %self.config.slave_id, "registered with master, entering live loop");
        self.live_loop(sink, stream, heartbeat_interval, stop).await
    }

    async fn dial(&self) -> Result<tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>, SlaveClientError> {
        if self.config.master_url.starts_with("wss://") {
            let tls_config = client_tls_config(self.config.insecure_skip_verify)?;
            let connector = Connector::Rustls(Arc::new(tls_config));
            let (ws, _response) =
                tokio_tungstenite::connect_async_tls_with_config(&self.config.master_url, None, false, Some(connector)).await?;
            Ok(ws)
        } else {
            let (ws, _response) = tokio_tungstenite::connect_async(&self.config.master_url).await?;
            Ok(ws)
        }
    }

    async fn live_loop<Sink, Stream>(
        &self,
        mut sink: Sink,
        mut stream: Stream,
        heartbeat_interval: Duration,
        stop: &CancellationToken,
    ) -> Result<ConnectionOutcome, SlaveClientError>
    where
        Sink: futures_util::Sink<tokio_tungstenite::tungstenite::Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
        Stream: futures_util::Stream<Item = Result<tokio_tungstenite::tungstenite::Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        let max_bytes = self.config.max_frame_bytes;
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Envelope>();
        let cancels: Arc<Mutex<HashMap<String, CancellationToken>>> = Arc::new(Mutex::new(HashMap::new()));
        let put_receivers: Arc<Mutex<HashMap<String, ChunkReceiver>>> = Arc::new(Mutex::new(HashMap::new()));

        let mut heartbeat = tokio::time::interval(heartbeat_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        heartbeat.tick().await; // first tick fires immediately; consume it

        loop {
            tokio::select! {
                _ = stop.cancelled() => return Ok(ConnectionOutcome::StopRequested),
                _ = heartbeat.tick() => {
                    let env = Envelope::new(mesh_core::short_token("req"), self.clock.now_secs(), EnvelopeKind::Heartbeat);
                    if write_envelope(&mut sink, &env, max_bytes).await.is_err() {
                        return Ok(ConnectionOutcome::Disconnected);
                    }
                }
                outgoing = outbound_rx.recv() => {
                    let Some(envelope) = outgoing else { continue };
                    if write_envelope(&mut sink, &envelope, max_bytes).await.is_err() {
                        return Ok(ConnectionOutcome::Disconnected);
                    }
                }
                incoming = read_envelope(&mut stream, max_bytes) => {
                    match incoming {
                        Ok(envelope) => self.handle_incoming(envelope, &outbound_tx, &cancels, &put_receivers),
                        Err(_) => return Ok(ConnectionOutcome::Disconnected),
                    }
                }
            }
        }
    }

    fn handle_incoming(
        &self,
        envelope: Envelope,
        outbound: &mpsc::UnboundedSender<Envelope>,
        cancels: &Arc<Mutex<HashMap<String, CancellationToken>>>,
        put_receivers: &Arc<Mutex<HashMap<String, ChunkReceiver>>>,
    ) {
        match envelope.kind {
            EnvelopeKind::Heartbeat => {
                let ack = Envelope::new(envelope.request_id, self.clock.now_secs(), EnvelopeKind::HeartbeatAck);
                let _ = outbound.send(ack);
            }
            EnvelopeKind::HeartbeatAck => {}
            EnvelopeKind::AgentRun { task, options, metadata } => {
                self.dispatch_agent_run(envelope.request_id, task, options, metadata, outbound.clone(), cancels.clone());
            }
            EnvelopeKind::AgentCancel => {
                if let Some(token) = cancels.lock().get(&envelope.request_id) {
                    token.cancel();
                }
            }
            EnvelopeKind::FilePutRequest { path, offset, size: _, end, digest, data } => {
                let reply_kind = handle_put_chunk(
                    self.config.file_root.as_deref(),
                    &mut put_receivers.lock(),
                    &envelope.request_id,
                    &path,
                    offset,
                    &data,
                    end,
                    digest.as_deref(),
                );
                let reply = Envelope::new(envelope.request_id, self.clock.now_secs(), reply_kind);
                let _ = outbound.send(reply);
            }
            EnvelopeKind::FileGetRequest { path } => {
                let now = self.clock.now_secs();
                for kind in handle_get_request(self.config.file_root.as_deref(), &path) {
                    let reply = Envelope::new(envelope.request_id.clone(), now, kind);
                    if outbound.send(reply).is_err() {
                        break;
                    }
                }
            }
            other => {
                tracing::debug!(kind = other.tag(), "slave ignoring unexpected inbound frame");
            }
        }
    }

    fn dispatch_agent_run(
        &self,
        request_id: String,
        task: String,
        options: Value,
        metadata: Value,
        outbound: mpsc::UnboundedSender<Envelope>,
        cancels: Arc<Mutex<HashMap<String, CancellationToken>>>,
    ) {
        let Some(permit) = self.inflight.try_acquire() else {
            let busy = Envelope::new(
                request_id,
                self.clock.now_secs(),
                EnvelopeKind::AgentResult {
                    status: "busy".to_string(),
                    output: None,
                    run_id: None,
                    error: None,
                },
            );
            let _ = outbound.send(busy);
            return;
        };

        let cancel = CancellationToken::new();
        cancels.lock().insert(request_id.clone(), cancel.clone());

        let handler = self.handler.clone();
        let clock = self.clock.clone();
        let cleanup_cancels = cancels.clone();
        let cleanup_request_id = request_id.clone();

        tokio::spawn(async move {
            let _permit = permit;
            let (events_tx, mut events_rx) = mpsc::unbounded_channel::<Value>();
            let forward_outbound = outbound.clone();
            let forward_request_id = request_id.clone();
            let forward_clock = clock.clone();
            let forward = tokio::spawn(async move {
                while let Some(event) = events_rx.recv().await {
                    let env = Envelope::new(forward_request_id.clone(), forward_clock.now_secs(), EnvelopeKind::AgentEvent { event });
                    if forward_outbound.send(env).is_err() {
                        break;
                    }
                }
            });

            let outcome = handler.run(task, options, metadata, events_tx, cancel).await;
            let _ = forward.await;

            let result = Envelope::new(
                request_id,
                clock.now_secs(),
                EnvelopeKind::AgentResult {
                    status: outcome.status,
                    output: outcome.output,
                    run_id: outcome.run_id,
                    error: outcome.error,
                },
            );
            let _ = outbound.send(result);
            cleanup_cancels.lock().remove(&cleanup_request_id);
        });
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
