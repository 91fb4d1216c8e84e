//! Event names published by the error reporter

/// Generic event published for every handled (non-security) error
pub const ERROR_OCCURRED: &str = "error:occurred";

/// Kind-specific events for the mapped subset
pub const ERROR_NETWORK: &str = "error:network";
pub const ERROR_VALIDATION: &str = "error:validation";
pub const ERROR_FACTORY: &str = "error:factory";
pub const ERROR_COMM: &str = "error:comm";
pub const ERROR_INTEGRATION: &str = "error:integration";

/// Dedicated event for failures inside a sandboxed embed context
pub const ERROR_EMBED: &str = "error:embed";

/// Recovery-attempt announcement; an event family, not a failure
pub const RECOVERY_ATTEMPT: &str = "recovery:attempt";
