//! Command implementations.
//!
//! Output goes to a caller-supplied writer so commands can be exercised
//! without a terminal.

use std::io::Write;

use nsf_alerts::{bootstrap, Alert, AlertsConfig, DispatchOutcome};
use serde::Serialize;
use tracing::info;

use crate::cli::{Format, SendArgs};
use crate::error::CliError;

/// Result of a `send` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReport {
    /// Alert name.
    pub alert: String,
    /// `delivered`, `delivered_by_reserved`, `dropped` or `failed`.
    pub outcome: &'static str,
    /// Adapter that delivered the alert.
    pub adapter: Option<String>,
}

impl SendReport {
    fn new(alert: &str, outcome: &DispatchOutcome) -> Self {
        let (label, adapter) = match outcome {
            DispatchOutcome::Delivered { adapter } => ("delivered", Some(adapter.clone())),
            DispatchOutcome::DeliveredByReserved { adapter } => {
                ("delivered_by_reserved", Some(adapter.clone()))
            }
            DispatchOutcome::Dropped => ("dropped", None),
            DispatchOutcome::Failed => ("failed", None),
        };
        Self {
            alert: alert.to_string(),
            outcome: label,
            adapter,
        }
    }

    /// Returns true if some adapter delivered the alert.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        self.adapter.is_some()
    }
}

/// Builds the alert described by the command-line arguments.
#[must_use]
pub fn build_alert(args: &SendArgs) -> Alert {
    let mut alert = Alert::new(
        args.severity,
        args.name.as_str(),
        args.summary.as_str(),
        args.description.as_str(),
    );
    if let Some(code) = &args.code {
        alert.set_code(code.as_str());
    }
    for (key, value) in &args.label {
        alert.add_additional_label(key.as_str(), value.as_str());
    }
    for (key, value) in &args.annotation {
        alert.add_additional_annotation(key.as_str(), value.as_str());
    }
    alert
}

/// Dispatches one alert and waits for its outcome.
///
/// Nothing is written here: adapters such as the console one print to
/// stdout from the delivery task, so output must not be locked meanwhile.
///
/// # Errors
///
/// Returns `CliError::Config` for configuration problems and
/// `CliError::Dispatch` when the delivery task could not run.
pub async fn send(config: &AlertsConfig, args: SendArgs) -> Result<SendReport, CliError> {
    let alert = build_alert(&args);
    let dispatcher = bootstrap::build_dispatcher(config, args.context.into())?;

    info!(alert = %alert.name(), severity = %alert.severity(), "dispatching alert");
    let name = alert.name().to_string();
    let outcome = dispatcher
        .dispatch_tracked(alert)?
        .await
        .map_err(|e| CliError::Dispatch(format!("delivery task failed: {e}")))?;

    Ok(SendReport::new(&name, &outcome))
}

/// Writes a send report, then fails if the alert was not delivered.
///
/// # Errors
///
/// Returns `CliError::Dispatch` for undelivered alerts and an error if
/// writing fails.
pub fn write_report<W: Write>(
    writer: &mut W,
    format: Format,
    report: &SendReport,
) -> Result<(), CliError> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut *writer, report)?;
            writeln!(writer)?;
        }
        Format::Table => {
            writeln!(writer, "{:<10} {:<24} {}", "ALERT", "OUTCOME", "ADAPTER")?;
            writeln!(
                writer,
                "{:<10} {:<24} {}",
                report.alert,
                report.outcome,
                report.adapter.as_deref().unwrap_or("-")
            )?;
        }
    }

    if !report.is_delivered() {
        return Err(CliError::Dispatch(format!(
            "alert {} was not delivered",
            report.alert
        )));
    }

    Ok(())
}

/// Prints the resolved configuration.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn show_config<W: Write>(
    writer: &mut W,
    format: Format,
    config: &AlertsConfig,
) -> Result<(), CliError> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut *writer, config)?;
            writeln!(writer)?;
        }
        Format::Table => {
            let slot = |kind: Option<nsf_alerts::AdapterKind>| {
                kind.map_or_else(|| "-".to_string(), |k| k.to_string())
            };
            writeln!(writer, "main adapter:        {}", slot(config.main_adapter))?;
            writeln!(writer, "reserve adapter:     {}", slot(config.reserve_adapter))?;
            writeln!(writer, "alertmanager url:    {}", config.prometheus.url)?;
            writeln!(writer, "attempts:            {}", config.prometheus.attempts)?;
            writeln!(writer, "interval:            {:?}", config.prometheus.interval)?;
            writeln!(writer, "demo mode:           {}", config.prometheus.is_demo)?;
        }
    }
    Ok(())
}
