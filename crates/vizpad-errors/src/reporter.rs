//! Central error reporter

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{error, warn};
use vizpad_events::EventDispatcher;

use crate::kind::ErrorKind;
use crate::report::AppError;
use crate::sink::NotificationSink;
use crate::topics;

const DEFAULT_MAX_RECORDS: usize = 1000;

/// Entry in the bounded in-memory error buffer
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: DateTime<Utc>,
    pub kind: ErrorKind,
    pub message: String,
}

/// Normalizes, logs, and republishes failures
///
/// Both the dispatcher and the notification sink are optional: without a
/// dispatcher the reporter only logs and records, without a sink nothing is
/// surfaced to the user. The reporter never lets a failure in its own sink
/// or logging escape outward.
pub struct ErrorReporter {
    dispatcher: Option<Arc<EventDispatcher>>,
    sink: Option<Arc<dyn NotificationSink>>,
    records: Mutex<VecDeque<ErrorRecord>>,
    max_records: usize,
}

impl ErrorReporter {
    /// Creates a reporter with no dispatcher and no sink
    pub fn new() -> Self {
        Self {
            dispatcher: None,
            sink: None,
            records: Mutex::new(VecDeque::new()),
            max_records: DEFAULT_MAX_RECORDS,
        }
    }

    /// Injects the dispatcher used to republish failures as events
    pub fn with_dispatcher(mut self, dispatcher: Arc<EventDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Injects the notification sink
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Caps the in-memory record buffer
    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records;
        self
    }

    /// Handles a failure: logs, records, notifies, republishes
    ///
    /// Accepts anything `Into<AppError>`; raw `anyhow::Error` values
    /// normalize to the runtime kind. With a dispatcher injected, publishes
    /// the generic [`topics::ERROR_OCCURRED`] event plus the kind-specific
    /// event for the mapped subset. Security-kind failures publish nothing.
    pub fn handle(&self, error: impl Into<AppError>) {
        self.process(error.into(), None);
    }

    /// Builds a tagged error and handles it
    pub fn create_and_handle(&self, kind: ErrorKind, message: &str, details: Option<Value>) {
        let mut error = AppError::new(kind, message);
        if let Some(details) = details {
            error = error.with_details(details);
        }
        self.process(error, None);
    }

    /// Handles a failure raised inside a sandboxed embed context
    ///
    /// Prefixes the message with the embed id, tags the details, and
    /// publishes [`topics::ERROR_EMBED`] in addition to the generic event.
    pub fn handle_embed_error(&self, embed_id: &str, message: &str, details: Option<Value>) {
        let mut details = details.unwrap_or_else(|| json!({}));
        if let Some(object) = details.as_object_mut() {
            object.insert("embedId".to_string(), json!(embed_id));
        }
        let error = AppError::new(
            ErrorKind::Runtime,
            format!("Embedded context '{embed_id}': {message}"),
        )
        .with_details(details);
        self.process(error, Some(topics::ERROR_EMBED));
    }

    /// Handles a failure from a named third-party visualization backend
    pub fn handle_integration_error(
        &self,
        integration: &str,
        message: &str,
        details: Option<Value>,
    ) {
        let mut details = details.unwrap_or_else(|| json!({}));
        if let Some(object) = details.as_object_mut() {
            object.insert("integration".to_string(), json!(integration));
        }
        let error = AppError::new(
            ErrorKind::Integration,
            format!("Integration '{integration}': {message}"),
        )
        .with_details(details);
        self.process(error, None);
    }

    /// Announces a recovery attempt for listeners to act on
    ///
    /// Publishes [`topics::RECOVERY_ATTEMPT`] and returns `true` when a
    /// dispatcher is injected; returns `false` otherwise. Never performs
    /// recovery itself.
    pub fn attempt_recovery(&self, kind: ErrorKind, context: &str) -> bool {
        match &self.dispatcher {
            Some(dispatcher) => {
                dispatcher.publish(
                    topics::RECOVERY_ATTEMPT,
                    json!({
                        "kind": kind.label(),
                        "context": context,
                        "timestamp": Utc::now().to_rfc3339(),
                    }),
                );
                true
            }
            None => false,
        }
    }

    /// Snapshot of the bounded record buffer, oldest first
    pub fn recent_records(&self) -> Vec<ErrorRecord> {
        self.records.lock().unwrap().iter().cloned().collect()
    }

    /// Routes dispatcher listener failures into this reporter
    ///
    /// Failures raised by listeners of `error:*` or `recovery:*` events are
    /// logged only, so a failing error-listener cannot loop the reporter
    /// back into itself.
    pub fn attach_to(self: &Arc<Self>, dispatcher: &EventDispatcher) {
        let reporter = Arc::downgrade(self);
        dispatcher.set_failure_handler(move |event, failure| {
            if event.starts_with("error:") || event.starts_with("recovery:") {
                warn!(
                    event_type = %event,
                    error = %failure,
                    "listener failed while handling an error event; not re-reported"
                );
                return;
            }
            if let Some(reporter) = reporter.upgrade() {
                reporter.handle(
                    AppError::runtime(format!("Listener failed for '{event}': {failure}"))
                        .with_details(json!({"event": event})),
                );
            }
        });
    }

    fn process(&self, error: AppError, extra_event: Option<&str>) {
        match error.kind {
            ErrorKind::Security | ErrorKind::Initialization | ErrorKind::Runtime => {
                error!(kind = %error.kind, details = ?error.details, "{}", error.message);
            }
            _ => {
                warn!(kind = %error.kind, details = ?error.details, "{}", error.message);
            }
        }

        {
            let mut records = self.records.lock().unwrap();
            records.push_back(ErrorRecord {
                timestamp: Utc::now(),
                kind: error.kind,
                message: error.message.clone(),
            });
            while records.len() > self.max_records {
                records.pop_front();
            }
        }

        if let Some(sink) = &self.sink {
            if let Err(sink_error) = sink.notify("VizPad", &error.user_message()) {
                warn!(error = %sink_error, "notification sink failed");
            }
        }

        // Origin-rejected messages stay invisible to dispatcher listeners:
        // an attacker must not learn which malformed messages provoke
        // application reactions.
        if error.kind == ErrorKind::Security {
            return;
        }

        if let Some(dispatcher) = &self.dispatcher {
            let payload = json!({
                "kind": error.kind.label(),
                "message": error.message,
                "details": error.details,
                "timestamp": Utc::now().to_rfc3339(),
            });
            dispatcher.publish(topics::ERROR_OCCURRED, payload.clone());
            if let Some(topic) = error.kind.event_name() {
                dispatcher.publish(topic, payload.clone());
            }
            if let Some(topic) = extra_event {
                dispatcher.publish(topic, payload);
            }
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("has_dispatcher", &self.dispatcher.is_some())
            .field("has_sink", &self.sink.is_some())
            .field("max_records", &self.max_records)
            .finish()
    }
}
