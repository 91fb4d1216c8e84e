//! VizPad Event Core
//!
//! Synchronous pub/sub dispatcher coordinating the editor, the preview
//! surface, and the sandboxed embed bridge.
//!
//! # Overview
//!
//! Components communicate through string-keyed events following a
//! `domain:action` convention (`editor:content-changed`,
//! `preview:rendered`, `error:occurred`). Payloads are `serde_json::Value`
//! and conventionally carry a `timestamp` field.
//!
//! # Guarantees
//!
//! - `publish` invokes a snapshot of the listener list taken at call time,
//!   in registration order; subscribing or unsubscribing from inside a
//!   handler never affects the in-flight publish.
//! - A failing listener is logged and isolated; the remaining listeners in
//!   the same publish still run. No listener failure escapes `publish`.
//! - One-shot registrations are removed before their listener runs, so
//!   re-entrant publishing cannot double-invoke them.
//!
//! # Failure routing
//!
//! The dispatcher never depends on the error-reporting layer. Listener
//! failures are handed to the handler installed with
//! [`EventDispatcher::set_failure_handler`]; `vizpad-errors` attaches the
//! reporter there.

pub mod dispatcher;

pub use dispatcher::{
    EventDispatcher, ListenerError, ListenerResult, Subscription,
};
