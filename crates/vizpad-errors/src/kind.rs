//! Closed failure classification

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::topics;

/// Category tag carried by every reported failure
///
/// The set is closed: call sites pick a kind at the failure site and the
/// value is never remapped afterwards. `Runtime` is the default for raw,
/// unclassified failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Startup or wiring failure
    Initialization,
    /// Remote endpoint unreachable or returned a transport-level failure
    Network,
    /// Document persistence failure
    Storage,
    /// Content or configuration rejected as malformed
    Validation,
    /// Default for raw, unclassified failures
    Runtime,
    /// Widget factory failure
    Factory,
    /// Widget factory registration failure
    FactoryRegistration,
    /// Widget instantiation failure
    ComponentCreation,
    /// Named third-party visualization backend failure
    Integration,
    /// Message rejected at the trust boundary (disallowed origin)
    Security,
    /// Bridge transport failure
    Comm,
}

impl ErrorKind {
    /// Stable string label used in logs and event payloads
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Initialization => "initialization",
            ErrorKind::Network => "network",
            ErrorKind::Storage => "storage",
            ErrorKind::Validation => "validation",
            ErrorKind::Runtime => "runtime",
            ErrorKind::Factory => "factory",
            ErrorKind::FactoryRegistration => "factory-registration",
            ErrorKind::ComponentCreation => "component-creation",
            ErrorKind::Integration => "integration",
            ErrorKind::Security => "security",
            ErrorKind::Comm => "comm",
        }
    }

    /// Kind-specific event published in addition to the generic one
    ///
    /// Only the mapped subset gets a dedicated event; the factory family
    /// shares one. Kinds outside the subset return `None`.
    pub fn event_name(&self) -> Option<&'static str> {
        match self {
            ErrorKind::Network => Some(topics::ERROR_NETWORK),
            ErrorKind::Validation => Some(topics::ERROR_VALIDATION),
            ErrorKind::Factory
            | ErrorKind::FactoryRegistration
            | ErrorKind::ComponentCreation => Some(topics::ERROR_FACTORY),
            ErrorKind::Comm => Some(topics::ERROR_COMM),
            ErrorKind::Integration => Some(topics::ERROR_INTEGRATION),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
