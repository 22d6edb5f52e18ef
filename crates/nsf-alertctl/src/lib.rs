//! # nsf-alertctl
//!
//! Command-line front end for `nsf-alerts`.
//!
//! Loads the alerting configuration from `NS_ALERTS_*` environment variables,
//! builds a dispatcher and either sends a single alert (`send`) or prints the
//! resolved configuration (`show-config`). Useful for checking an
//! Alertmanager wiring from a deployment shell.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;

pub use cli::{Cli, Commands, Format, SendArgs};
pub use error::CliError;
