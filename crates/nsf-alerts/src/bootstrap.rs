//! Wires a [`Dispatcher`] from an [`AlertsConfig`].

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::{Adapter, AdapterKind};
use crate::alert::AlertContext;
use crate::config::AlertsConfig;
use crate::console::ConsoleAdapter;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::prometheus::PrometheusAdapter;

/// Builds the adapter selected by `kind`.
#[must_use]
pub fn build_adapter(
    kind: AdapterKind,
    config: &AlertsConfig,
    context: &AlertContext,
) -> Arc<dyn Adapter> {
    match kind {
        AdapterKind::Console => Arc::new(ConsoleAdapter::new()),
        AdapterKind::Prometheus => Arc::new(PrometheusAdapter::new(
            config.prometheus.clone(),
            context.clone(),
        )),
    }
}

/// Builds a dispatcher from configuration.
///
/// When only a reserve adapter is configured it is promoted to main here,
/// once. The dispatcher itself never promotes at dispatch time.
///
/// # Errors
///
/// Returns a configuration error if `config` fails validation.
pub fn build_dispatcher(config: &AlertsConfig, context: AlertContext) -> Result<Dispatcher> {
    config.validate()?;

    let (main, reserve) = match (config.main_adapter, config.reserve_adapter) {
        (None, Some(reserve)) => {
            warn!(adapter = %reserve, "no main alert adapter configured, promoting reserve adapter");
            (Some(reserve), None)
        }
        slots => slots,
    };

    let mut dispatcher = match main {
        Some(kind) => Dispatcher::new(build_adapter(kind, config, &context)),
        None => {
            warn!("no alert adapters configured, alerts will not be delivered");
            Dispatcher::without_adapter()
        }
    };

    if let Some(kind) = reserve {
        dispatcher.use_reserved_adapter(build_adapter(kind, config, &context));
    }

    info!(
        main = ?main.map(|k| k.as_str()),
        reserve = ?reserve.map(|k| k.as_str()),
        project = %context.project,
        service = %context.service,
        "alert dispatcher ready"
    );

    Ok(dispatcher)
}
