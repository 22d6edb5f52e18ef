//! Alert severity levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AlertError, Result};

/// Rendering used for integer levels outside the known range.
pub const UNKNOWN_SEVERITY: &str = "unknown";

/// The urgency level of an alert, ordered from least to most urgent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Diagnostic noise.
    Debug = 0,
    /// Informational, no action required.
    #[default]
    Info = 1,
    /// Should be investigated.
    Warning = 2,
    /// Something failed.
    Error = 3,
    /// Requires immediate attention.
    Critical = 4,
    /// Wake somebody up.
    Urgent = 5,
}

impl Severity {
    /// All severities in ascending order.
    pub const ALL: [Self; 6] = [
        Self::Debug,
        Self::Info,
        Self::Warning,
        Self::Error,
        Self::Critical,
        Self::Urgent,
    ];

    /// Returns the severity as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
            Self::Urgent => "urgent",
        }
    }

    /// Returns the integer level of this severity.
    #[must_use]
    pub const fn level(&self) -> i32 {
        *self as i32
    }

    /// Converts an integer level into a severity, if it is in range.
    #[must_use]
    pub const fn from_level(level: i32) -> Option<Self> {
        match level {
            0 => Some(Self::Debug),
            1 => Some(Self::Info),
            2 => Some(Self::Warning),
            3 => Some(Self::Error),
            4 => Some(Self::Critical),
            5 => Some(Self::Urgent),
            _ => None,
        }
    }

    /// Renders an integer level, yielding `"unknown"` when out of range.
    #[must_use]
    pub const fn level_name(level: i32) -> &'static str {
        match Self::from_level(level) {
            Some(severity) => severity.as_str(),
            None => UNKNOWN_SEVERITY,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str() == wanted)
            .ok_or_else(|| AlertError::InvalidConfig {
                key: "severity".to_string(),
                reason: format!("unknown severity '{s}'"),
            })
    }
}
