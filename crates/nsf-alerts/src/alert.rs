//! The alert value type and the sender context.
//!
//! This module provides:
//! - [`Alert`]: a single alert raised by a service
//! - [`AlertContext`]: the project/service/instance identity stamped onto
//!   alerts by adapters that forward them to external receivers

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::severity::Severity;

/// An alert raised by a service.
///
/// `name` is the stable identifier used by the [`Registry`](crate::Registry)
/// and by receivers for grouping. Everything except `code` and the two
/// additional mappings is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    date: DateTime<Utc>,
    severity: Severity,
    name: String,
    code: String,
    summary: String,
    description: String,
    additional_labels: HashMap<String, String>,
    additional_annotations: HashMap<String, String>,
}

impl Alert {
    /// Creates a new alert stamped with the current UTC time.
    #[must_use]
    pub fn new(
        severity: Severity,
        name: impl Into<String>,
        summary: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date: Utc::now(),
            severity,
            name: name.into(),
            code: String::new(),
            summary: summary.into(),
            description: description.into(),
            additional_labels: HashMap::new(),
            additional_annotations: HashMap::new(),
        }
    }

    /// When the alert was created.
    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// The alert severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// The alert name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The secondary classifier code, empty if unset.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Short human-readable summary.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Longer description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Extra labels merged into receiver payloads.
    #[must_use]
    pub const fn additional_labels(&self) -> &HashMap<String, String> {
        &self.additional_labels
    }

    /// Extra annotations merged into receiver payloads.
    #[must_use]
    pub const fn additional_annotations(&self) -> &HashMap<String, String> {
        &self.additional_annotations
    }

    /// Sets the classifier code.
    pub fn set_code(&mut self, code: impl Into<String>) -> &mut Self {
        self.code = code.into();
        self
    }

    /// Inserts or overwrites an additional label.
    pub fn add_additional_label(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.additional_labels.insert(key.into(), value.into());
        self
    }

    /// Inserts or overwrites an additional annotation.
    pub fn add_additional_annotation(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.additional_annotations.insert(key.into(), value.into());
        self
    }

    /// Sets the classifier code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.set_code(code);
        self
    }

    /// Adds an additional label.
    #[must_use]
    pub fn with_additional_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_additional_label(key, value);
        self
    }

    /// Adds an additional annotation.
    #[must_use]
    pub fn with_additional_annotation(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.add_additional_annotation(key, value);
        self
    }

    /// Returns an independent copy of this alert stamped with the current time.
    ///
    /// Unlike [`Clone::clone`], which keeps the original timestamp, this is
    /// meant for re-raising an alert.
    #[must_use]
    pub fn fresh_clone(&self) -> Self {
        Self {
            date: Utc::now(),
            ..self.clone()
        }
    }
}

/// Identity of the service that raises alerts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertContext {
    /// Project the service belongs to.
    pub project: String,
    /// Service name.
    pub service: String,
    /// Instance identifier (host, pod, ...).
    pub instance: String,
}

impl AlertContext {
    /// Creates a new context.
    #[must_use]
    pub fn new(
        project: impl Into<String>,
        service: impl Into<String>,
        instance: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            service: service.into(),
            instance: instance.into(),
        }
    }
}
