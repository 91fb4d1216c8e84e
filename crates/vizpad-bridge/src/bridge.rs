//! Host-side bridge to sandboxed embed contexts

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock as StdRwLock};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;
use vizpad_errors::{ErrorKind, ErrorReporter};
use vizpad_events::EventDispatcher;

use crate::config::BridgeConfig;
use crate::embed::EmbedHandle;
use crate::error::{BridgeError, Result};
use crate::message::{InboundEnvelope, WireMessage, TYPE_RESPONSE};
use crate::origins::OriginAllowList;
use crate::responder::EmbedResponder;
use crate::routes::EventRoutes;

/// Bridge lifecycle; transitions only forward, `Disposed` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Uninitialized,
    Connected,
    Disposed,
}

struct PendingRequest {
    request_type: String,
    sender: oneshot::Sender<Result<Value>>,
}

struct EmbedBinding {
    origin: String,
    sender: mpsc::UnboundedSender<WireMessage>,
}

/// Everything the inbound pump task shares with the bridge facade
struct InboundRouter {
    dispatcher: Arc<EventDispatcher>,
    reporter: Arc<ErrorReporter>,
    routes: EventRoutes,
    origins: OriginAllowList,
    pending: RwLock<HashMap<Uuid, PendingRequest>>,
    responders: RwLock<HashMap<String, Arc<dyn EmbedResponder>>>,
    embeds: RwLock<HashMap<String, EmbedBinding>>,
}

impl InboundRouter {
    /// Handles one stamped envelope, in the fixed trust order: origin check,
    /// response settlement, event translation, responder dispatch, ignore
    async fn route(&self, envelope: InboundEnvelope) {
        let InboundEnvelope {
            origin,
            embed_id,
            message,
        } = envelope;

        if !self.origins.is_allowed(&origin) {
            self.reporter.create_and_handle(
                ErrorKind::Security,
                &format!("Rejected message from disallowed origin '{origin}'"),
                Some(json!({
                    "origin": origin,
                    "embedId": embed_id,
                    "messageType": message.message_type,
                })),
            );
            return;
        }

        if let Some(binding) = self.embeds.read().await.get(&embed_id) {
            if binding.origin != origin {
                warn!(
                    embed_id = %embed_id,
                    expected = %binding.origin,
                    actual = %origin,
                    "envelope origin differs from the embed's declared send-origin"
                );
            }
        }

        if message.message_type == TYPE_RESPONSE {
            self.settle_response(message).await;
            return;
        }

        if let Some(local_event) = self.routes.inbound_event(&message.message_type) {
            self.dispatcher.publish(&local_event, message.payload);
            return;
        }

        let responder = self
            .responders
            .read()
            .await
            .get(&message.message_type)
            .cloned();
        if let Some(responder) = responder {
            self.answer_request(&embed_id, message, responder).await;
            return;
        }

        debug!(
            message_type = %message.message_type,
            embed_id = %embed_id,
            "ignoring unhandled inbound message"
        );
    }

    async fn settle_response(&self, message: WireMessage) {
        let Some(correlation_id) = message.correlation_id else {
            debug!("response without correlation id; ignoring");
            return;
        };
        match self.pending.write().await.remove(&correlation_id) {
            Some(record) => {
                debug!(
                    request_type = %record.request_type,
                    %correlation_id,
                    "settling request"
                );
                // The requester may have timed out in the meantime; its
                // receiver is gone and the late send is discarded.
                let _ = record.sender.send(Ok(message.payload));
            }
            None => {
                debug!(%correlation_id, "stale or unknown correlation id; ignoring");
            }
        }
    }

    async fn answer_request(
        &self,
        embed_id: &str,
        message: WireMessage,
        responder: Arc<dyn EmbedResponder>,
    ) {
        let Some(correlation_id) = message.correlation_id else {
            debug!(
                message_type = %message.message_type,
                "request without correlation id; ignoring"
            );
            return;
        };
        let request_type = message.message_type.clone();
        let body = match responder.respond(message.payload).await {
            Ok(result) => json!({ "result": result }),
            Err(error) => json!({ "error": error.to_string() }),
        };
        let response = WireMessage::response(body, correlation_id).with_target(embed_id);
        let delivered = match self.embeds.read().await.get(embed_id) {
            Some(binding) => binding.sender.send(response).is_ok(),
            None => false,
        };
        if !delivered {
            self.reporter.create_and_handle(
                ErrorKind::Comm,
                &format!("Failed to deliver response for '{request_type}' to embed '{embed_id}'"),
                Some(json!({
                    "embedId": embed_id,
                    "requestType": request_type,
                    "correlationId": correlation_id,
                })),
            );
        }
    }
}

/// Secured request/response bridge to sandboxed embed contexts
///
/// Maps dispatcher events to outbound wire messages and inbound wire
/// messages back to dispatcher events, and implements the correlation-id
/// request/response pattern with timeout over an origin allow-list.
///
/// Transport failures never reach callers as panics: `send_event` reports a
/// comm-kind error instead of failing, and `request` reports delivery
/// failures before returning them. Timeouts go to the caller, who decides.
pub struct EmbedBridge {
    router: Arc<InboundRouter>,
    config: BridgeConfig,
    state: StdRwLock<BridgeState>,
    inbound_tx: mpsc::UnboundedSender<InboundEnvelope>,
    inbound_rx: Mutex<Option<mpsc::UnboundedReceiver<InboundEnvelope>>>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl EmbedBridge {
    /// Creates an unconnected bridge
    pub fn new(
        dispatcher: Arc<EventDispatcher>,
        reporter: Arc<ErrorReporter>,
        config: BridgeConfig,
    ) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let origins = OriginAllowList::new(config.host_origin.clone());
        for origin in &config.allowed_origins {
            origins.add(origin.clone());
        }
        Self {
            router: Arc::new(InboundRouter {
                dispatcher,
                reporter,
                routes: config.routes.clone(),
                origins,
                pending: RwLock::new(HashMap::new()),
                responders: RwLock::new(HashMap::new()),
                embeds: RwLock::new(HashMap::new()),
            }),
            config,
            state: StdRwLock::new(BridgeState::Uninitialized),
            inbound_tx,
            inbound_rx: Mutex::new(Some(inbound_rx)),
            pump: Mutex::new(None),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> BridgeState {
        *self.state.read().unwrap()
    }

    /// Transport-side sender used to deliver stamped inbound envelopes
    pub fn inbound_sender(&self) -> mpsc::UnboundedSender<InboundEnvelope> {
        self.inbound_tx.clone()
    }

    /// Binds an embed context and starts the inbound pump
    ///
    /// Idempotent with respect to the pump: the first call spawns the single
    /// inbound listener task, later calls only bind additional embeds.
    /// Fails once the bridge is disposed; disposal is terminal.
    pub async fn connect(&self, embed: &EmbedHandle) -> Result<()> {
        if self.state() == BridgeState::Disposed {
            return Err(BridgeError::Disposed);
        }

        self.router.embeds.write().await.insert(
            embed.id().to_string(),
            EmbedBinding {
                origin: embed.origin().to_string(),
                sender: embed.sender(),
            },
        );

        {
            let mut pump = self.pump.lock().unwrap();
            if pump.is_none() {
                if let Some(mut receiver) = self.inbound_rx.lock().unwrap().take() {
                    let router = self.router.clone();
                    *pump = Some(tokio::spawn(async move {
                        while let Some(envelope) = receiver.recv().await {
                            router.route(envelope).await;
                        }
                    }));
                }
            }
        }

        *self.state.write().unwrap() = BridgeState::Connected;
        debug!(embed_id = %embed.id(), origin = %embed.origin(), "embed connected");
        Ok(())
    }

    /// Forwards a local event to an embed context
    ///
    /// Events with no outbound route are dropped by design: not every local
    /// event is meant to cross the boundary. An unreachable embed is
    /// reported as a comm-kind error; this method never fails to its caller.
    pub fn send_event(&self, embed: &EmbedHandle, event: &str, payload: Value) {
        let Some(wire_type) = self.router.routes.outbound_type(event) else {
            debug!(event_type = %event, "no outbound route; dropping event");
            return;
        };
        let message = WireMessage::event(wire_type, payload).with_target(embed.id());
        if let Err(error) = embed.post(message) {
            self.router.reporter.create_and_handle(
                ErrorKind::Comm,
                &format!("Failed to deliver '{event}' to embed '{}'", embed.id()),
                Some(json!({
                    "embedId": embed.id(),
                    "event": event,
                    "error": error.to_string(),
                })),
            );
        }
    }

    /// Sends a request and awaits the correlated response
    ///
    /// Resolves with the response payload (error-tagged bodies included) or
    /// fails with [`BridgeError::Timeout`] when no response arrives within
    /// `timeout` (the configured default when `None`). Each call settles
    /// exactly once.
    pub async fn request(
        &self,
        embed: &EmbedHandle,
        request_type: &str,
        payload: Value,
        timeout: Option<Duration>,
    ) -> Result<Value> {
        match self.state() {
            BridgeState::Disposed => return Err(BridgeError::Disposed),
            BridgeState::Uninitialized => return Err(BridgeError::NotConnected),
            BridgeState::Connected => {}
        }

        let correlation_id = Uuid::new_v4();
        let (sender, receiver) = oneshot::channel();
        self.router.pending.write().await.insert(
            correlation_id,
            PendingRequest {
                request_type: request_type.to_string(),
                sender,
            },
        );

        let message =
            WireMessage::request(request_type, payload, correlation_id).with_target(embed.id());
        if let Err(error) = embed.post(message) {
            self.router.pending.write().await.remove(&correlation_id);
            self.router.reporter.create_and_handle(
                ErrorKind::Comm,
                &format!(
                    "Failed to deliver request '{request_type}' to embed '{}'",
                    embed.id()
                ),
                Some(json!({
                    "embedId": embed.id(),
                    "requestType": request_type,
                    "correlationId": correlation_id,
                })),
            );
            return Err(error);
        }

        let timeout = timeout.unwrap_or_else(|| self.config.default_timeout());
        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(result)) => result,
            // Record dropped without settling; only disposal does that.
            Ok(Err(_)) => Err(BridgeError::Disposed),
            Err(_) => {
                self.router.pending.write().await.remove(&correlation_id);
                let timeout_ms = timeout.as_millis() as u64;
                warn!(
                    request_type = %request_type,
                    %correlation_id,
                    timeout_ms,
                    "request timed out"
                );
                Err(BridgeError::Timeout(timeout_ms))
            }
        }
    }

    /// Registers the responder for an inbound request type, replacing any
    /// previous one
    pub async fn register_responder(
        &self,
        request_type: impl Into<String>,
        responder: Arc<dyn EmbedResponder>,
    ) {
        self.router
            .responders
            .write()
            .await
            .insert(request_type.into(), responder);
    }

    /// Replaces the allow-listed origins
    pub fn set_allowed_origins(&self, origins: Vec<String>) {
        self.router.origins.replace(origins);
    }

    /// Adds one origin to the allow-list
    pub fn add_allowed_origin(&self, origin: impl Into<String>) {
        self.router.origins.add(origin);
    }

    /// Whether `origin` is the host's own origin or allow-listed
    pub fn is_allowed_origin(&self, origin: &str) -> bool {
        self.router.origins.is_allowed(origin)
    }

    /// Number of requests awaiting settlement
    pub async fn pending_request_count(&self) -> usize {
        self.router.pending.read().await.len()
    }

    /// Tears the bridge down; terminal
    ///
    /// Stops the inbound pump, force-rejects every pending request with
    /// [`BridgeError::Disposed`], and clears the embed and responder maps.
    pub async fn dispose(&self) {
        {
            let mut state = self.state.write().unwrap();
            if *state == BridgeState::Disposed {
                return;
            }
            *state = BridgeState::Disposed;
        }

        if let Some(pump) = self.pump.lock().unwrap().take() {
            pump.abort();
        }

        let drained: Vec<PendingRequest> = {
            let mut pending = self.router.pending.write().await;
            pending.drain().map(|(_, record)| record).collect()
        };
        for record in drained {
            debug!(request_type = %record.request_type, "force-rejecting pending request");
            let _ = record.sender.send(Err(BridgeError::Disposed));
        }

        self.router.embeds.write().await.clear();
        self.router.responders.write().await.clear();
        debug!("bridge disposed");
    }
}

impl std::fmt::Debug for EmbedBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbedBridge")
            .field("state", &self.state())
            .field("host_origin", &self.config.host_origin)
            .finish()
    }
}
