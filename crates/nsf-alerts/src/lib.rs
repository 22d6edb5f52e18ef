//! Alert dispatch and delivery for services.
//!
//! `nsf-alerts` routes [`Alert`]s raised by a service to delivery backends
//! ([`Adapter`]s) with an optional allow-list ([`Registry`]) and a
//! primary/reserved fallback chain ([`Dispatcher`]).
//!
//! # Features
//!
//! - **Fire-and-forget dispatch**: `dispatch` never blocks or fails the caller
//! - **Fallback**: a reserved adapter is tried when the primary one fails
//! - **Registry gating**: unknown alert names are dropped before delivery
//! - **Alertmanager**: v2 API payloads with per-adapter retries and demo mode
//! - **Console**: full alert dump to the log and stdout
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use nsf_alerts::{Alert, ConsoleAdapter, Dispatcher, Severity};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut dispatcher = Dispatcher::new(Arc::new(ConsoleAdapter::new()));
//! dispatcher
//!     .register(Alert::new(Severity::Error, "queue_stalled", "", ""))
//!     .unwrap();
//!
//! let mut alert = Alert::new(
//!     Severity::Error,
//!     "queue_stalled",
//!     "queue is not draining",
//!     "no messages consumed for 5 minutes",
//! );
//! alert.add_additional_label("queue", "payments");
//!
//! let outcome = dispatcher.dispatch_tracked(alert).unwrap().await.unwrap();
//! assert!(outcome.is_delivered());
//! # }
//! ```
//!
//! # Configuration
//!
//! Services usually build the dispatcher from `NS_ALERTS_*` variables:
//!
//! ```rust,no_run
//! use nsf_alerts::{bootstrap, AlertContext, AlertsConfig};
//!
//! let config = AlertsConfig::from_env()?;
//! let dispatcher = bootstrap::build_dispatcher(
//!     &config,
//!     AlertContext::new("neon", "indexer", "node-1"),
//! )?;
//! # Ok::<(), nsf_alerts::AlertError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod adapter;
pub mod alert;
pub mod bootstrap;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod error;
pub mod prometheus;
pub mod registry;
pub mod severity;
pub mod transport;

// Re-export main types at crate root
pub use adapter::{Adapter, AdapterKind, SendFuture};
pub use alert::{Alert, AlertContext};
pub use config::{AlertsConfig, PrometheusConfig};
pub use console::ConsoleAdapter;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{AlertError, ErrorKind, Result};
pub use prometheus::{PostableAlert, PrometheusAdapter};
pub use registry::Registry;
pub use severity::Severity;
pub use transport::{AlertTransport, ReqwestTransport, Sleeper, TokioSleeper, TransportResponse};
