//! Tagged error values

use serde_json::Value;
use thiserror::Error;

use crate::kind::ErrorKind;

/// A classified failure: kind, message, and optional structured details
///
/// Constructed once at the failure site and never mutated afterwards. Raw
/// failures convert via `From<anyhow::Error>` and normalize to
/// [`ErrorKind::Runtime`].
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub details: Option<Value>,
}

impl AppError {
    /// Creates a tagged error with no details
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Attaches structured details
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Shorthand for the default runtime kind
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, message)
    }

    /// Short user-facing text for notification surfaces
    pub fn user_message(&self) -> String {
        match self.kind {
            ErrorKind::Initialization => {
                "VizPad failed to initialize. Reload the editor.".to_string()
            }
            ErrorKind::Network => {
                "A network operation failed. Check your connection and try again.".to_string()
            }
            ErrorKind::Storage => "Saving or loading the document failed.".to_string(),
            ErrorKind::Validation => "The document contains invalid content.".to_string(),
            ErrorKind::Runtime => {
                "Something went wrong. The operation may not have completed.".to_string()
            }
            ErrorKind::Factory | ErrorKind::FactoryRegistration | ErrorKind::ComponentCreation => {
                "A visualization widget could not be created.".to_string()
            }
            ErrorKind::Integration => "A visualization backend failed to respond.".to_string(),
            ErrorKind::Security => "A message from an untrusted source was blocked.".to_string(),
            ErrorKind::Comm => "Communication with an embedded widget failed.".to_string(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::runtime(error.to_string())
    }
}
