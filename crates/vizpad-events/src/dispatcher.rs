//! Event routing and subscription management

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, warn};

/// Error value returned by a failing listener
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for listener callbacks
pub type ListenerResult = std::result::Result<(), ListenerError>;

/// Handler invoked whenever a listener fails during a publish
type FailureHandler = Arc<dyn Fn(&str, &ListenerError) + Send + Sync>;

type NamedCallback = Arc<dyn Fn(&Value) -> ListenerResult + Send + Sync>;
type WildcardCallback = Arc<dyn Fn(&str, &Value) -> ListenerResult + Send + Sync>;

/// Removal capability returned by the subscribe methods
///
/// Holds the event name (or the wildcard marker) and the registration id.
/// Pass it back to [`EventDispatcher::unsubscribe`] to remove the listener.
/// Dropping a `Subscription` does not unsubscribe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    event: Option<String>,
    id: u64,
}

impl Subscription {
    /// The event this subscription targets, `None` for wildcard listeners
    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    /// The registration id
    pub fn id(&self) -> u64 {
        self.id
    }
}

struct NamedEntry {
    id: u64,
    once: bool,
    callback: NamedCallback,
}

struct WildcardEntry {
    id: u64,
    callback: WildcardCallback,
}

/// Synchronous pub/sub registry
///
/// Owns the per-event listener lists. Thread-safe; listeners are invoked on
/// the publishing thread, outside the internal locks, so handlers may freely
/// subscribe, unsubscribe, or publish again.
pub struct EventDispatcher {
    listeners: RwLock<HashMap<String, Vec<NamedEntry>>>,
    wildcard: RwLock<Vec<WildcardEntry>>,
    failure_handler: RwLock<Option<FailureHandler>>,
    next_id: AtomicU64,
    debug_mode: AtomicBool,
}

impl EventDispatcher {
    /// Creates an empty dispatcher with debug tracing off
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            wildcard: RwLock::new(Vec::new()),
            failure_handler: RwLock::new(None),
            next_id: AtomicU64::new(1),
            debug_mode: AtomicBool::new(false),
        }
    }

    fn mint_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn debug_enabled(&self) -> bool {
        self.debug_mode.load(Ordering::Relaxed)
    }

    /// Registers a listener for `event` and returns its removal capability
    ///
    /// Registering the same closure twice creates two independent
    /// registrations with distinct ids.
    pub fn subscribe<F>(&self, event: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&Value) -> ListenerResult + Send + Sync + 'static,
    {
        self.register(event.into(), Arc::new(callback), false)
    }

    /// Registers a listener removed at the next publish of `event`, before
    /// it runs, so re-entrant publishing cannot invoke it twice
    pub fn subscribe_once<F>(&self, event: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&Value) -> ListenerResult + Send + Sync + 'static,
    {
        self.register(event.into(), Arc::new(callback), true)
    }

    fn register(&self, event: String, callback: NamedCallback, once: bool) -> Subscription {
        let id = self.mint_id();
        if self.debug_enabled() {
            debug!(event_type = %event, listener_id = id, once, "subscribing listener");
        }
        let mut listeners = self.listeners.write().unwrap();
        listeners
            .entry(event.clone())
            .or_default()
            .push(NamedEntry { id, once, callback });
        Subscription {
            event: Some(event),
            id,
        }
    }

    /// Registers a wildcard listener invoked on every publish, after the
    /// named listeners for that event
    ///
    /// Wildcard registrations live in a separate registry and do not show up
    /// in the named-event introspection methods.
    pub fn subscribe_all<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&str, &Value) -> ListenerResult + Send + Sync + 'static,
    {
        let id = self.mint_id();
        if self.debug_enabled() {
            debug!(listener_id = id, "subscribing wildcard listener");
        }
        self.wildcard.write().unwrap().push(WildcardEntry {
            id,
            callback: Arc::new(callback),
        });
        Subscription { event: None, id }
    }

    /// Removes the registration behind `subscription`
    ///
    /// Returns `false` (no-op) when the registration is already gone.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        match &subscription.event {
            Some(event) => {
                let mut listeners = self.listeners.write().unwrap();
                let Some(entries) = listeners.get_mut(event) else {
                    return false;
                };
                let before = entries.len();
                entries.retain(|entry| entry.id != subscription.id);
                let removed = entries.len() < before;
                if entries.is_empty() {
                    listeners.remove(event);
                }
                removed
            }
            None => {
                let mut wildcard = self.wildcard.write().unwrap();
                let before = wildcard.len();
                wildcard.retain(|entry| entry.id != subscription.id);
                wildcard.len() < before
            }
        }
    }

    /// Synchronously delivers `payload` to the listeners registered for
    /// `event` at call time, in registration order, then to the wildcard
    /// listeners
    ///
    /// Listener failures are logged, handed to the failure handler, and
    /// never propagate to the caller.
    pub fn publish(&self, event: &str, payload: Value) {
        let snapshot: Vec<(u64, NamedCallback)> = {
            let mut listeners = self.listeners.write().unwrap();
            match listeners.get_mut(event) {
                Some(entries) => {
                    let snapshot = entries
                        .iter()
                        .map(|entry| (entry.id, entry.callback.clone()))
                        .collect();
                    // One-shot registrations leave the registry before their
                    // callback runs.
                    entries.retain(|entry| !entry.once);
                    if entries.is_empty() {
                        listeners.remove(event);
                    }
                    snapshot
                }
                None => Vec::new(),
            }
        };

        if self.debug_enabled() {
            debug!(
                event_type = %event,
                listener_count = snapshot.len(),
                "publishing event"
            );
        }

        for (id, callback) in snapshot {
            if let Err(error) = callback(&payload) {
                warn!(
                    event_type = %event,
                    listener_id = id,
                    error = %error,
                    "listener failed"
                );
                self.report_failure(event, &error);
            }
        }

        let wildcard: Vec<(u64, WildcardCallback)> = self
            .wildcard
            .read()
            .unwrap()
            .iter()
            .map(|entry| (entry.id, entry.callback.clone()))
            .collect();
        for (id, callback) in wildcard {
            if let Err(error) = callback(event, &payload) {
                warn!(
                    event_type = %event,
                    listener_id = id,
                    error = %error,
                    "wildcard listener failed"
                );
                self.report_failure(event, &error);
            }
        }
    }

    fn report_failure(&self, event: &str, error: &ListenerError) {
        let handler = self.failure_handler.read().unwrap().clone();
        if let Some(handler) = handler {
            handler(event, error);
        }
    }

    /// Installs the handler invoked with `(event, error)` for every listener
    /// failure, replacing any previous handler
    pub fn set_failure_handler<F>(&self, handler: F)
    where
        F: Fn(&str, &ListenerError) + Send + Sync + 'static,
    {
        *self.failure_handler.write().unwrap() = Some(Arc::new(handler));
    }

    /// Whether any named listener is registered for `event`
    pub fn has_listeners(&self, event: &str) -> bool {
        self.listeners
            .read()
            .unwrap()
            .get(event)
            .is_some_and(|entries| !entries.is_empty())
    }

    /// Event names with at least one named listener, sorted
    pub fn active_event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.listeners.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of named listeners registered for `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .read()
            .unwrap()
            .get(event)
            .map_or(0, Vec::len)
    }

    /// Toggles debug tracing of subscribe/publish activity; off by default
    pub fn set_debug_mode(&self, enabled: bool) {
        self.debug_mode.store(enabled, Ordering::Relaxed);
    }

    /// Removes every named listener for `event`
    pub fn clear_event(&self, event: &str) {
        self.listeners.write().unwrap().remove(event);
    }

    /// Removes every registration, named and wildcard
    pub fn clear_all(&self) {
        self.listeners.write().unwrap().clear();
        self.wildcard.write().unwrap().clear();
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("active_events", &self.active_event_names())
            .field("debug_mode", &self.debug_enabled())
            .finish()
    }
}
