//! Origin allow-list consulted on every inbound envelope

use std::collections::HashSet;
use std::sync::RwLock;

/// Add-only set of origins trusted for inbound messages
///
/// The host's own origin is always trusted. There is deliberately no way to
/// remove a single origin: once trusted, an origin cannot be downgraded at
/// runtime. `replace` exists for wholesale reconfiguration only.
#[derive(Debug)]
pub struct OriginAllowList {
    own_origin: String,
    allowed: RwLock<HashSet<String>>,
}

impl OriginAllowList {
    /// Creates an allow-list trusting only `own_origin`
    pub fn new(own_origin: impl Into<String>) -> Self {
        Self {
            own_origin: own_origin.into(),
            allowed: RwLock::new(HashSet::new()),
        }
    }

    /// Replaces the allow-listed origins
    pub fn replace(&self, origins: Vec<String>) {
        let mut allowed = self.allowed.write().unwrap();
        allowed.clear();
        allowed.extend(origins);
    }

    /// Adds one origin
    pub fn add(&self, origin: impl Into<String>) {
        self.allowed.write().unwrap().insert(origin.into());
    }

    /// Whether `origin` is the host's own origin or allow-listed
    pub fn is_allowed(&self, origin: &str) -> bool {
        origin == self.own_origin || self.allowed.read().unwrap().contains(origin)
    }

    /// Allow-listed origins, sorted; excludes the implicit own origin
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = self.allowed.read().unwrap().iter().cloned().collect();
        origins.sort();
        origins
    }
}
