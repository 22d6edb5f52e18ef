//! Error types for the nsf-alerts crate.

use thiserror::Error;

/// Broad classification of an [`AlertError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Misconfiguration detected while loading settings. Aborts startup.
    Configuration,
    /// A programming contract was broken (e.g. duplicate registration).
    Invariant,
    /// A delivery attempt or dispatch path failed. Logged, never surfaced
    /// to callers of `dispatch`.
    Delivery,
}

/// Errors that can occur in the alerting system.
#[derive(Debug, Error)]
pub enum AlertError {
    /// No primary adapter was installed on the dispatcher.
    #[error("alert adapter wasn't installed")]
    AdapterNotInstalled,

    /// Fallback was requested but no reserved adapter was installed.
    #[error("reserved alert adapter wasn't installed")]
    ReservedAdapterNotInstalled,

    /// The Alertmanager base URL was not configured.
    #[error("prometheus alert manager url is empty")]
    PrometheusUrlEmpty,

    /// The configured adapter name is not one this crate knows.
    #[error("unregistered alert adapter: {name}")]
    UnknownAdapter {
        /// The adapter name as configured.
        name: String,
    },

    /// A configuration value could not be used.
    #[error("invalid configuration for {key}: {reason}")]
    InvalidConfig {
        /// The configuration key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// An alert with the same name is already registered.
    #[error("alert registry: trying to register alert with same name {name}")]
    DuplicateAlert {
        /// The duplicated alert name.
        name: String,
    },

    /// Alerts without a name cannot be registered.
    #[error("alert registry: alert name cannot be empty")]
    EmptyAlertName,

    /// The HTTP transport failed before a response was received.
    #[error("transport error: {reason}")]
    Transport {
        /// The underlying transport failure.
        reason: String,
    },

    /// The receiver answered with a status other than 200.
    #[error("bad response status code - {status}; response body: {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// Every delivery attempt failed.
    #[error("{adapter}: attempts to send alert {alert} exceeded")]
    AttemptsExceeded {
        /// Adapter that gave up.
        adapter: String,
        /// Name of the alert that could not be delivered.
        alert: String,
    },

    /// `dispatch` was called with no async runtime to run delivery on.
    #[error("no tokio runtime available to dispatch alert {alert}")]
    NoRuntime {
        /// Name of the dropped alert.
        alert: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl AlertError {
    /// Returns the classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PrometheusUrlEmpty | Self::UnknownAdapter { .. } | Self::InvalidConfig { .. } => {
                ErrorKind::Configuration
            }
            Self::DuplicateAlert { .. } | Self::EmptyAlertName => ErrorKind::Invariant,
            Self::AdapterNotInstalled
            | Self::ReservedAdapterNotInstalled
            | Self::Transport { .. }
            | Self::UnexpectedStatus { .. }
            | Self::AttemptsExceeded { .. }
            | Self::NoRuntime { .. }
            | Self::Serialization(_) => ErrorKind::Delivery,
        }
    }

    /// Returns true if the error must abort the enclosing initialization path.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration | ErrorKind::Invariant)
    }

    /// Stable numeric code, for the errors that carry one.
    #[must_use]
    pub const fn code(&self) -> Option<u32> {
        match self {
            Self::AdapterNotInstalled => Some(100_201_001),
            Self::ReservedAdapterNotInstalled => Some(100_201_002),
            Self::PrometheusUrlEmpty => Some(100_102_003),
            Self::UnknownAdapter { .. } => Some(100_101_004),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AlertError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AlertError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            reason: err.to_string(),
        }
    }
}

/// Result type for alert operations.
pub type Result<T> = std::result::Result<T, AlertError>;
