//! Command-line argument parsing with clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use nsf_alerts::{AlertContext, Severity};

/// Send alerts through the configured `NS_ALERTS_*` adapters.
#[derive(Parser, Debug, Clone)]
#[command(name = "nsf-alertctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Emit logs as JSON.
    #[arg(long)]
    pub json_logs: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable output.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Dispatch one alert and wait for the outcome.
    Send(SendArgs),

    /// Print the alerting configuration resolved from the environment.
    ShowConfig,
}

/// Identity stamped on outgoing alerts.
#[derive(Args, Debug, Clone)]
pub struct ContextArgs {
    /// Project name.
    #[arg(long, env = "NS_PROJECT", default_value = "default")]
    pub project: String,

    /// Service name.
    #[arg(long, env = "NS_SERVICE", default_value = "nsf-alertctl")]
    pub service: String,

    /// Instance identifier.
    #[arg(long, env = "NS_INSTANCE", default_value = "local")]
    pub instance: String,
}

impl From<ContextArgs> for AlertContext {
    fn from(args: ContextArgs) -> Self {
        Self::new(args.project, args.service, args.instance)
    }
}

/// Arguments for the send command.
#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Alert name.
    pub name: String,

    /// Short summary.
    pub summary: String,

    /// Longer description.
    #[arg(default_value = "")]
    pub description: String,

    /// Severity (debug, info, warning, error, critical, urgent).
    #[arg(short, long, default_value = "info", value_parser = parse_severity)]
    pub severity: Severity,

    /// Classifier code.
    #[arg(long)]
    pub code: Option<String>,

    /// Additional labels.
    #[arg(short, long, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub label: Vec<(String, String)>,

    /// Additional annotations.
    #[arg(short, long, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub annotation: Vec<(String, String)>,

    /// Sender identity.
    #[command(flatten)]
    pub context: ContextArgs,
}

fn parse_severity(value: &str) -> Result<Severity, String> {
    value.parse().map_err(|e: nsf_alerts::AlertError| e.to_string())
}

/// Parses a `KEY=VALUE` pair.
///
/// # Errors
///
/// Returns an error if there is no `=` or the key is empty.
pub fn parse_key_value(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, val)) if !key.is_empty() => Ok((key.to_string(), val.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{value}'")),
    }
}
