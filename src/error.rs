//! Error types for state-hub.

use crate::notify::SubscriptionId;
use std::fmt;

/// Result type alias for state-hub operations.
pub type Result<T> = std::result::Result<T, HubError>;

/// Errors that can occur when working with a notification hub.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// A subscriber failed during a notification pass and the hub is
    /// configured to propagate failures.
    #[error("Subscriber '{subscriber}' ({id}) failed: {source}")]
    SubscriberFailed {
        /// Registration that failed
        id: SubscriptionId,
        /// Name reported by the subscriber
        subscriber: String,
        /// The error the subscriber returned
        #[source]
        source: SubscriberError,
    },

    /// The new state was rejected by the configured validator.
    #[error("State rejected: {0}")]
    StateRejected(String),

    /// Failed to load hub settings.
    #[error("Failed to load settings: {0}")]
    Settings(String),

    /// Settings were loaded but are not usable.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[cfg(feature = "history")]
    /// Rollback was requested on a hub built without history.
    #[error("State history is not enabled for this hub")]
    HistoryDisabled,

    #[cfg(feature = "history")]
    /// Not enough history to rollback the requested number of steps.
    #[error("Insufficient history: cannot rollback {requested} steps (only {available} available)")]
    InsufficientHistory {
        /// Number of steps requested to roll back
        requested: usize,
        /// Number of earlier versions available
        available: usize,
    },

    #[cfg(feature = "history")]
    /// The requested version is not (or no longer) in history.
    #[error("Version {0} not found in history")]
    VersionNotFound(u64),
}

/// Error returned by a subscriber's `notify`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SubscriberError {
    message: String,
}

impl SubscriberError {
    /// Create a subscriber error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error returned by a state validator.
#[derive(Debug)]
pub enum ValidationError {
    /// Custom validation error with a message.
    Custom(String),

    /// The state violates a named rule.
    InvalidState {
        /// The rule that was violated
        rule: String,
        /// Why the state breaks it
        reason: String,
    },
}

impl ValidationError {
    /// Create a custom validation error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid state error for a named rule.
    pub fn invalid_state(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidState {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(msg) => write!(f, "{}", msg),
            Self::InvalidState { rule, reason } => {
                write!(f, "Rule '{}' violated: {}", rule, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for HubError {
    fn from(err: ValidationError) -> Self {
        HubError::StateRejected(err.to_string())
    }
}
