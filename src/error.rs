//! Error types for the reminder subsystem.

/// Coarse failure classes used to decide how loudly to report a failure.
///
/// None of them ever reach the user; they only steer logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The platform lacks notifications or push entirely.
    CapabilityAbsent,
    /// The user has not granted notification permission.
    PermissionDenied,
    /// Network, provider or registry failure; retried on the next natural run.
    Transient,
}

/// Top-level error type for the reminder subsystem.
#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    /// Configuration file or value error.
    #[error("config error: {0}")]
    Config(String),

    /// Malformed `HH:MM` value.
    #[error("invalid time '{0}': expected HH:MM (24h)")]
    InvalidTime(String),

    /// Notification permission was not granted.
    #[error("permission error: {0}")]
    Permission(String),

    /// The platform does not offer the requested capability.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Push provider error (handle, channel readiness, token fetch).
    #[error("push error: {0}")]
    Push(String),

    /// Remote token registry error.
    #[error("registry error: {0}")]
    Registry(String),

    /// Notification display error.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ReminderError {
    /// Classify this error for logging purposes.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Unsupported(_) => FailureKind::CapabilityAbsent,
            Self::Permission(_) => FailureKind::PermissionDenied,
            _ => FailureKind::Transient,
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ReminderError>;
