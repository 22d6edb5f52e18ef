//! The delivery backend abstraction.
//!
//! An [`Adapter`] takes an [`Alert`] and delivers it somewhere: the console,
//! an Alertmanager instance, or anything else that implements the trait.
//! Retry policy belongs to each adapter; the dispatcher only falls back.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::alert::Alert;
use crate::error::{AlertError, Result};

/// Future returned by [`Adapter::send`].
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Trait for alert delivery backends.
pub trait Adapter: Send + Sync + fmt::Debug {
    /// Returns the name of this adapter.
    fn name(&self) -> &str;

    /// Delivers an alert.
    ///
    /// # Errors
    ///
    /// Returns an error of kind [`ErrorKind::Delivery`](crate::ErrorKind::Delivery)
    /// when the alert could not be delivered.
    fn send<'a>(&'a self, alert: &'a Alert) -> SendFuture<'a>;
}

/// The adapters that can be selected through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// [`ConsoleAdapter`](crate::ConsoleAdapter).
    Console,
    /// [`PrometheusAdapter`](crate::PrometheusAdapter).
    Prometheus,
}

impl AdapterKind {
    /// Returns the adapter name as used in configuration.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::Prometheus => "prometheus",
        }
    }

    /// Parses an optional adapter setting, where an empty value means "none".
    ///
    /// # Errors
    ///
    /// Returns `AlertError::UnknownAdapter` for names that are not recognised.
    pub fn parse_optional(value: &str) -> Result<Option<Self>> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        value.parse().map(Some)
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AdapterKind {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "prometheus" => Ok(Self::Prometheus),
            _ => Err(AlertError::UnknownAdapter {
                name: s.to_string(),
            }),
        }
    }
}
