//! Allow-list of known alert names.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::alert::Alert;
use crate::error::{AlertError, Result};

/// A concurrency-safe catalog of alerts a service is allowed to raise.
///
/// Registration normally happens once at startup; lookups happen on every
/// dispatch. Entries are never removed.
#[derive(Debug, Default)]
pub struct Registry {
    alerts: RwLock<HashMap<String, Alert>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an alert under its name.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::DuplicateAlert` if the name is already taken and
    /// `AlertError::EmptyAlertName` for an unnamed alert. Both are fatal.
    pub fn register(&self, alert: Alert) -> Result<()> {
        if alert.name().is_empty() {
            return Err(AlertError::EmptyAlertName);
        }

        let mut alerts = self.alerts.write();
        if alerts.contains_key(alert.name()) {
            return Err(AlertError::DuplicateAlert {
                name: alert.name().to_string(),
            });
        }

        debug!(alert = %alert.name(), "registered alert");
        alerts.insert(alert.name().to_string(), alert);

        Ok(())
    }

    /// Returns true if an alert with this name is registered.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.alerts.read().contains_key(name)
    }

    /// Snapshot of all registered alerts, in no particular order.
    #[must_use]
    pub fn get_all(&self) -> Vec<Alert> {
        self.alerts.read().values().cloned().collect()
    }

    /// Number of registered alerts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alerts.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alerts.read().is_empty()
    }
}
