//! Route tables between local events and wire types

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Local event name prefix for inbound embed events
pub const EMBED_EVENT_PREFIX: &str = "embed:";

/// Maps local events to outbound wire types and recognizes inbound types
///
/// Only mapped local events cross the boundary; everything else stays
/// host-internal and is dropped by [`send_event`](crate::EmbedBridge::send_event).
/// Recognized inbound wire types republish locally under the
/// `embed:<type>` convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRoutes {
    #[serde(default)]
    outbound: HashMap<String, String>,
    #[serde(default)]
    inbound: HashSet<String>,
}

impl EventRoutes {
    /// Creates empty route tables
    pub fn empty() -> Self {
        Self {
            outbound: HashMap::new(),
            inbound: HashSet::new(),
        }
    }

    /// Adds an outbound route from a local event to a wire type
    pub fn with_outbound(
        mut self,
        event: impl Into<String>,
        wire_type: impl Into<String>,
    ) -> Self {
        self.outbound.insert(event.into(), wire_type.into());
        self
    }

    /// Recognizes an inbound wire type as an embed event
    pub fn with_inbound(mut self, wire_type: impl Into<String>) -> Self {
        self.inbound.insert(wire_type.into());
        self
    }

    /// Wire type for a local event, `None` when the event stays local
    pub fn outbound_type(&self, event: &str) -> Option<&str> {
        self.outbound.get(event).map(String::as_str)
    }

    /// Local event name for a recognized inbound wire type
    pub fn inbound_event(&self, wire_type: &str) -> Option<String> {
        self.inbound
            .contains(wire_type)
            .then(|| format!("{EMBED_EVENT_PREFIX}{wire_type}"))
    }
}

impl Default for EventRoutes {
    fn default() -> Self {
        Self::empty()
            .with_outbound("editor:content-changed", "source-update")
            .with_outbound("editor:config-changed", "config-update")
            .with_outbound("preview:theme-changed", "theme-update")
            .with_inbound("rendered")
            .with_inbound("resized")
            .with_inbound("interaction")
    }
}
