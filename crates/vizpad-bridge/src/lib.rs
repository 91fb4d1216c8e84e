//! VizPad Embed Bridge
//!
//! Secured messaging layer between the host and the sandboxed embed
//! contexts hosting third-party visualization widgets.
//!
//! # Architecture
//!
//! The bridge sits on top of the event core and the error reporter:
//!
//! 1. **Wire codec** (`message`): the `{type, payload, correlationId?,
//!    source, target?}` contract shared with embedded contexts
//! 2. **Origin allow-list** (`origins`): the trust boundary, consulted
//!    before anything else on every inbound envelope
//! 3. **Route tables** (`routes`): which local events cross the boundary,
//!    and which inbound types republish as `embed:<type>` events
//! 4. **Bridge** (`bridge`): correlation-id request/response with timeout,
//!    responder dispatch, and the single inbound pump
//!
//! # Security
//!
//! Envelopes from disallowed origins are reported as security-kind errors
//! and discarded before any routing; no dispatcher event ever fires for
//! them. Origins are add-only at runtime.
//!
//! # Lifecycle
//!
//! `Uninitialized -> Connected -> Disposed`, forward only. `dispose`
//! force-rejects every pending request and is terminal.

pub mod bridge;
pub mod config;
pub mod embed;
pub mod error;
pub mod message;
pub mod origins;
pub mod responder;
pub mod routes;

pub use bridge::{BridgeState, EmbedBridge};
pub use config::BridgeConfig;
pub use embed::EmbedHandle;
pub use error::{BridgeError, Result};
pub use message::{InboundEnvelope, WireMessage, SOURCE_EMBED, SOURCE_HOST, TYPE_RESPONSE};
pub use origins::OriginAllowList;
pub use responder::EmbedResponder;
pub use routes::{EventRoutes, EMBED_EVENT_PREFIX};
