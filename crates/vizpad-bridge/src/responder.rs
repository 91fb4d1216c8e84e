//! Responder seam for embed-originated requests

use async_trait::async_trait;
use serde_json::Value;

/// Answers inbound requests from an embed context
///
/// A failing responder becomes an error-tagged response on the wire, never
/// an uncaught failure in the host.
#[async_trait]
pub trait EmbedResponder: Send + Sync {
    async fn respond(&self, payload: Value) -> anyhow::Result<Value>;
}
