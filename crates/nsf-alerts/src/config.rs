//! Alerting configuration, loaded from `NS_ALERTS_*` environment variables.
//!
//! | variable | default |
//! |---|---|
//! | `NS_ALERTS_MAIN_ADAPTER` | `prometheus` |
//! | `NS_ALERTS_RESERVE_ADAPTER` | `console` |
//! | `NS_ALERTS_PROMETHEUS_ALERT_MANAGER_URL` | required when an adapter is `prometheus` |
//! | `NS_ALERTS_PROMETHEUS_ATTEMPTS` | `5` |
//! | `NS_ALERTS_PROMETHEUS_INTERVAL` | `1s` |
//! | `NS_ALERTS_PROMETHEUS_DEMO_MODE` | `false` |
//!
//! An empty adapter variable means "no adapter". Malformed numbers, booleans
//! and durations fall back to their default with a warning.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::adapter::AdapterKind;
use crate::error::{AlertError, Result};

/// Environment variable selecting the main adapter.
pub const ENV_MAIN_ADAPTER: &str = "NS_ALERTS_MAIN_ADAPTER";
/// Environment variable selecting the reserve adapter.
pub const ENV_RESERVE_ADAPTER: &str = "NS_ALERTS_RESERVE_ADAPTER";
/// Environment variable holding the Alertmanager base URL.
pub const ENV_PROMETHEUS_URL: &str = "NS_ALERTS_PROMETHEUS_ALERT_MANAGER_URL";
/// Environment variable holding the attempt budget.
pub const ENV_PROMETHEUS_ATTEMPTS: &str = "NS_ALERTS_PROMETHEUS_ATTEMPTS";
/// Environment variable holding the delay between attempts.
pub const ENV_PROMETHEUS_INTERVAL: &str = "NS_ALERTS_PROMETHEUS_INTERVAL";
/// Environment variable enabling demo mode.
pub const ENV_PROMETHEUS_DEMO_MODE: &str = "NS_ALERTS_PROMETHEUS_DEMO_MODE";

/// Settings for the Prometheus Alertmanager adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrometheusConfig {
    /// Alertmanager base URL, without the `/api/v2/alerts` suffix.
    pub url: String,
    /// Maximum number of send attempts.
    pub attempts: u32,
    /// Delay between attempts.
    pub interval: Duration,
    /// When set, nothing is sent and every send reports success.
    pub is_demo: bool,
}

impl PrometheusConfig {
    /// Default attempt budget.
    pub const DEFAULT_ATTEMPTS: u32 = 5;
    /// Default delay between attempts.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

    /// Creates a configuration with default retry settings.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::PrometheusUrlEmpty` if the URL is empty.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(AlertError::PrometheusUrlEmpty);
        }

        Ok(Self {
            url,
            ..Self::unset()
        })
    }

    /// Sets the attempt budget. Zero is treated as one.
    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Sets the delay between attempts.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Enables or disables demo mode.
    #[must_use]
    pub const fn demo(mut self, is_demo: bool) -> Self {
        self.is_demo = is_demo;
        self
    }

    /// Defaults with no URL. Only valid when no adapter uses Prometheus.
    fn unset() -> Self {
        Self {
            url: String::new(),
            attempts: Self::DEFAULT_ATTEMPTS,
            interval: Self::DEFAULT_INTERVAL,
            is_demo: false,
        }
    }
}

/// Which adapters to use and how to configure them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Adapter tried first.
    pub main_adapter: Option<AdapterKind>,
    /// Adapter tried when the main one fails.
    pub reserve_adapter: Option<AdapterKind>,
    /// Prometheus adapter settings.
    pub prometheus: PrometheusConfig,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            main_adapter: Some(AdapterKind::Prometheus),
            reserve_adapter: Some(AdapterKind::Console),
            prometheus: PrometheusConfig::unset(),
        }
    }
}

impl AlertsConfig {
    /// Console-only configuration, handy for local runs.
    #[must_use]
    pub fn console_only() -> Self {
        Self {
            main_adapter: Some(AdapterKind::Console),
            reserve_adapter: None,
            prometheus: PrometheusConfig::unset(),
        }
    }

    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`AlertsConfig::from_lookup`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration using `lookup` to resolve variables.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::UnknownAdapter` for an unrecognised adapter name
    /// and `AlertError::PrometheusUrlEmpty` if Prometheus is selected without
    /// a URL.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let main_adapter = match lookup(ENV_MAIN_ADAPTER) {
            Some(value) => AdapterKind::parse_optional(&value)?,
            None => Some(AdapterKind::Prometheus),
        };
        let reserve_adapter = match lookup(ENV_RESERVE_ADAPTER) {
            Some(value) => AdapterKind::parse_optional(&value)?,
            None => Some(AdapterKind::Console),
        };

        let prometheus = PrometheusConfig {
            url: lookup(ENV_PROMETHEUS_URL).unwrap_or_default(),
            attempts: parse_or(
                &lookup,
                ENV_PROMETHEUS_ATTEMPTS,
                PrometheusConfig::DEFAULT_ATTEMPTS,
                parse_count,
            )
            .max(1),
            interval: parse_or(
                &lookup,
                ENV_PROMETHEUS_INTERVAL,
                PrometheusConfig::DEFAULT_INTERVAL,
                parse_duration,
            ),
            is_demo: parse_or(&lookup, ENV_PROMETHEUS_DEMO_MODE, false, parse_bool),
        };

        let config = Self {
            main_adapter,
            reserve_adapter,
            prometheus,
        };
        config.validate()?;

        Ok(config)
    }

    /// Returns true if either adapter slot selects `kind`.
    #[must_use]
    pub fn uses(&self, kind: AdapterKind) -> bool {
        self.main_adapter == Some(kind) || self.reserve_adapter == Some(kind)
    }

    /// Checks cross-field requirements.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::PrometheusUrlEmpty` if Prometheus is selected but
    /// has no URL.
    pub fn validate(&self) -> Result<()> {
        if self.uses(AdapterKind::Prometheus) && self.prometheus.url.trim().is_empty() {
            return Err(AlertError::PrometheusUrlEmpty);
        }
        Ok(())
    }
}

fn parse_or<F, T, P>(lookup: &F, key: &str, default: T, parse: P) -> T
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };

    parse(raw.trim()).unwrap_or_else(|| {
        warn!(key, value = %raw, "malformed configuration value, using default");
        default
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

/// Parses durations such as `1s`, `500ms`, `1m30s` or `1.5h`.
///
/// Supported units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare
/// `0` is accepted; any other unitless number is rejected.
#[must_use]
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let value = value.strip_prefix('+').unwrap_or(value);
    if value == "0" {
        return Some(Duration::ZERO);
    }
    if value.is_empty() {
        return None;
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut total_nanos = 0f64;
    let mut rest = value;

    while !rest.is_empty() {
        let number_len = rest.find(|c: char| !is_number(c)).unwrap_or(rest.len());
        if number_len == 0 {
            return None;
        }
        let number: f64 = rest[..number_len].parse().ok()?;
        rest = &rest[number_len..];

        let unit_len = rest.find(is_number).unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };
        rest = &rest[unit_len..];

        total_nanos += number * nanos_per_unit;
    }

    Some(Duration::from_nanos(total_nanos.round() as u64))
}

/// Parses a whole count, truncating fractional input such as `3.0`.
///
/// Negative values clamp to zero.
fn parse_count(value: &str) -> Option<u32> {
    let value = value.trim();
    let n = match value.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            let f: f64 = value.parse().ok()?;
            if !f.is_finite() {
                return None;
            }
            f.trunc() as i64
        }
    };
    Some(u32::try_from(n.max(0)).unwrap_or(u32::MAX))
}
