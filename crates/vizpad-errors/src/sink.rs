//! Notification sink seam

/// Receives short user-facing notifications
///
/// Injected into the reporter by bootstrapping glue; a toast surface in the
/// host shell is the usual implementation. Calls are fire-and-forget: the
/// reporter logs and discards any returned error, so a broken sink can never
/// take the reporting path down with it.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, title: &str, message: &str) -> anyhow::Result<()>;
}
