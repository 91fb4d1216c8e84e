//! Error types for the embed bridge

use thiserror::Error;

/// Errors that can occur on the bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No response arrived within the request timeout
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// The bridge was disposed; disposal is terminal
    #[error("Bridge disposed")]
    Disposed,

    /// `connect` has not been called yet
    #[error("Bridge is not connected")]
    NotConnected,

    /// The embed context's inbox is gone (context torn down)
    #[error("Embed context '{0}' is unreachable")]
    EmbedUnreachable(String),
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
