//! Handle to a sandboxed embed context

use tokio::sync::mpsc;

use crate::error::{BridgeError, Result};
use crate::message::WireMessage;

/// Host-side handle to one sandboxed embed context
///
/// The embedded context is a restricted environment hosting third-party
/// visualization code; the handle's channel is the only way to reach it.
/// `origin` is the origin the context is expected to send from, recorded at
/// [`connect`](crate::EmbedBridge::connect) time and checked against the
/// allow-list on every inbound envelope.
///
/// # Embedded context contract
///
/// The context must post messages shaped
/// `{type, payload, correlationId?, source: "embed", target?}`, must
/// validate the host's origin before acting on anything inbound, and must
/// echo the `correlationId` of a request on its response.
#[derive(Debug, Clone)]
pub struct EmbedHandle {
    id: String,
    origin: String,
    sender: mpsc::UnboundedSender<WireMessage>,
}

impl EmbedHandle {
    /// Creates a handle and the embed-side inbox it posts into
    pub fn new(
        id: impl Into<String>,
        origin: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<WireMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                id: id.into(),
                origin: origin.into(),
                sender,
            },
            receiver,
        )
    }

    /// Identifier of the embed context
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Origin the context is expected to send from
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub(crate) fn sender(&self) -> mpsc::UnboundedSender<WireMessage> {
        self.sender.clone()
    }

    /// Posts a message into the embed's inbox
    ///
    /// Fails with [`BridgeError::EmbedUnreachable`] when the context has
    /// been torn down; never panics.
    pub(crate) fn post(&self, message: WireMessage) -> Result<()> {
        self.sender
            .send(message)
            .map_err(|_| BridgeError::EmbedUnreachable(self.id.clone()))
    }
}
