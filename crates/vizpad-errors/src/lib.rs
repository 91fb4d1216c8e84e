//! VizPad Error Reporting
//!
//! Normalizes raw failures into tagged [`AppError`] values, logs them,
//! optionally surfaces them through a [`NotificationSink`], and republishes
//! them as dispatcher events for other layers to react to.
//!
//! # Event contract
//!
//! With a dispatcher injected, every handled error publishes the generic
//! [`topics::ERROR_OCCURRED`] event, plus exactly one kind-specific event
//! when the kind belongs to the mapped subset (network, validation, the
//! factory family, comm, integration). Security-kind failures are the
//! exception: they are logged and recorded but never published, so rejected
//! cross-context messages cannot be probed through application reactions.
//!
//! Recovery is announced, never performed:
//! [`ErrorReporter::attempt_recovery`] publishes
//! [`topics::RECOVERY_ATTEMPT`] and leaves the strategy to listeners.

pub mod kind;
pub mod report;
pub mod reporter;
pub mod sink;
pub mod topics;

pub use kind::ErrorKind;
pub use report::AppError;
pub use reporter::{ErrorRecord, ErrorReporter};
pub use sink::NotificationSink;
