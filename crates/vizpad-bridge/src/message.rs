//! Wire message codec for the embed boundary

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Source tag on host-originated messages
pub const SOURCE_HOST: &str = "host";
/// Source tag on embed-originated messages
pub const SOURCE_EMBED: &str = "embed";
/// Reserved wire type for request/response settlement
pub const TYPE_RESPONSE: &str = "response";

/// Message crossing the embed boundary
///
/// Serialized in camelCase to match the embedded-context contract:
/// `{type, payload, correlationId?, source, target?}`. A request is a
/// message whose `type` names the request type and carries a
/// `correlationId`; the response echoes the id under the reserved
/// `"response"` type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub payload: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl WireMessage {
    /// Host-originated fire-and-forget event
    pub fn event(message_type: impl Into<String>, payload: Value) -> Self {
        Self {
            message_type: message_type.into(),
            payload,
            correlation_id: None,
            source: SOURCE_HOST.to_string(),
            target: None,
        }
    }

    /// Host-originated request expecting a correlated response
    pub fn request(request_type: impl Into<String>, payload: Value, correlation_id: Uuid) -> Self {
        Self {
            message_type: request_type.into(),
            payload,
            correlation_id: Some(correlation_id),
            source: SOURCE_HOST.to_string(),
            target: None,
        }
    }

    /// Host-originated response to an embed request
    pub fn response(payload: Value, correlation_id: Uuid) -> Self {
        Self {
            message_type: TYPE_RESPONSE.to_string(),
            payload,
            correlation_id: Some(correlation_id),
            source: SOURCE_HOST.to_string(),
            target: None,
        }
    }

    /// Embed-originated event, as the embedded context posts it
    pub fn embed_event(message_type: impl Into<String>, payload: Value) -> Self {
        Self {
            message_type: message_type.into(),
            payload,
            correlation_id: None,
            source: SOURCE_EMBED.to_string(),
            target: None,
        }
    }

    /// Embed-originated response echoing a request's correlation id
    pub fn embed_response(payload: Value, correlation_id: Uuid) -> Self {
        Self {
            message_type: TYPE_RESPONSE.to_string(),
            payload,
            correlation_id: Some(correlation_id),
            source: SOURCE_EMBED.to_string(),
            target: None,
        }
    }

    /// Embed-originated request expecting a host response
    pub fn embed_request(
        request_type: impl Into<String>,
        payload: Value,
        correlation_id: Uuid,
    ) -> Self {
        Self {
            message_type: request_type.into(),
            payload,
            correlation_id: Some(correlation_id),
            source: SOURCE_EMBED.to_string(),
            target: None,
        }
    }

    /// Addresses the message to a specific embed
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Inbound wire message stamped by the transport
///
/// `origin` and `embed_id` are metadata of the delivering channel, never
/// read from message content; the allow-list check trusts only them.
#[derive(Debug, Clone)]
pub struct InboundEnvelope {
    pub origin: String,
    pub embed_id: String,
    pub message: WireMessage,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_to_the_embed_contract_shape() {
        let id = Uuid::new_v4();
        let message = WireMessage::request("export-png", json!({"scale": 2}), id)
            .with_target("chart-1");
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["type"], "export-png");
        assert_eq!(value["payload"]["scale"], 2);
        assert_eq!(value["correlationId"], json!(id.to_string()));
        assert_eq!(value["source"], "host");
        assert_eq!(value["target"], "chart-1");
    }

    #[test]
    fn events_omit_correlation_and_target_fields() {
        let value = serde_json::to_value(WireMessage::event("theme-update", json!({}))).unwrap();

        assert!(value.get("correlationId").is_none());
        assert!(value.get("target").is_none());
    }

    #[test]
    fn deserializes_embed_posted_json() {
        let id = Uuid::new_v4();
        let raw = json!({
            "type": "response",
            "payload": {"result": {"png": "..."}},
            "correlationId": id.to_string(),
            "source": "embed",
        });
        let message: WireMessage = serde_json::from_value(raw).unwrap();

        assert_eq!(message.message_type, TYPE_RESPONSE);
        assert_eq!(message.correlation_id, Some(id));
        assert!(message.target.is_none());
    }
}
