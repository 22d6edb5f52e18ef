//! Alert dispatcher: registry gating plus primary/reserved fallback.
//!
//! [`Dispatcher::dispatch`] returns immediately. Delivery runs on a spawned
//! tokio task and its outcome is only visible in the logs. Callers that need
//! the outcome opt in through [`Dispatcher::dispatch_tracked`].

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::adapter::Adapter;
use crate::alert::Alert;
use crate::error::{AlertError, Result};
use crate::registry::Registry;

/// What happened to a dispatched alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The alert was not registered and was discarded.
    Dropped,
    /// The primary adapter delivered the alert.
    Delivered {
        /// Name of the adapter.
        adapter: String,
    },
    /// The primary adapter failed and the reserved adapter delivered it.
    DeliveredByReserved {
        /// Name of the reserved adapter.
        adapter: String,
    },
    /// No adapter delivered the alert.
    Failed,
}

impl DispatchOutcome {
    /// Returns true if some adapter delivered the alert.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. } | Self::DeliveredByReserved { .. })
    }
}

/// Routes alerts to a primary adapter, falling back to a reserved one.
///
/// The reserved adapter is only consulted after the primary adapter fails.
/// A dispatcher without a primary adapter reports every alert as undelivered
/// rather than promoting the reserved adapter.
#[derive(Debug, Default)]
pub struct Dispatcher {
    adapter: Option<Arc<dyn Adapter>>,
    reserved_adapter: Option<Arc<dyn Adapter>>,
    registry: Option<Arc<Registry>>,
}

impl Dispatcher {
    /// Creates a dispatcher with the given primary adapter.
    #[must_use]
    pub fn new(adapter: Arc<dyn Adapter>) -> Self {
        Self {
            adapter: Some(adapter),
            ..Self::default()
        }
    }

    /// Creates a dispatcher with no adapters installed.
    #[must_use]
    pub fn without_adapter() -> Self {
        Self::default()
    }

    /// Attaches a registry if none is attached yet and returns it.
    pub fn use_registry(&mut self) -> &Arc<Registry> {
        self.registry.get_or_insert_with(|| Arc::new(Registry::new()))
    }

    /// Installs the fallback adapter, replacing any previous one.
    pub fn use_reserved_adapter(&mut self, adapter: Arc<dyn Adapter>) {
        self.reserved_adapter = Some(adapter);
    }

    /// Registers an alert, attaching a registry first if needed.
    ///
    /// # Errors
    ///
    /// Fails with a fatal error on duplicate or empty names; see
    /// [`Registry::register`].
    pub fn register(&mut self, alert: Alert) -> Result<()> {
        self.use_registry().register(alert)
    }

    /// The attached registry, if any.
    #[must_use]
    pub fn registry(&self) -> Option<&Arc<Registry>> {
        self.registry.as_ref()
    }

    /// The primary adapter, if any.
    #[must_use]
    pub fn adapter(&self) -> Option<&Arc<dyn Adapter>> {
        self.adapter.as_ref()
    }

    /// The reserved adapter, if any.
    #[must_use]
    pub fn reserved_adapter(&self) -> Option<&Arc<dyn Adapter>> {
        self.reserved_adapter.as_ref()
    }

    /// Dispatches an alert without waiting for delivery.
    ///
    /// Unregistered alerts (when a registry is attached) are logged and
    /// dropped. Must be called from within a tokio runtime; otherwise the
    /// alert is logged and dropped.
    pub fn dispatch(&self, alert: Alert) {
        if !self.admits(&alert) {
            return;
        }
        if let Err(err) = self.spawn_delivery(alert) {
            error!(error = %err, "failed to dispatch alert");
        }
    }

    /// Dispatches an alert and returns a handle resolving to its outcome.
    ///
    /// The registry is consulted before anything else, so an unregistered
    /// alert is always reported as such.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::NoRuntime` when called outside a tokio runtime.
    pub fn dispatch_tracked(&self, alert: Alert) -> Result<JoinHandle<DispatchOutcome>> {
        if !self.admits(&alert) {
            let runtime = Handle::try_current().map_err(|_| AlertError::NoRuntime {
                alert: alert.name().to_string(),
            })?;
            return Ok(runtime.spawn(async { DispatchOutcome::Dropped }));
        }
        self.spawn_delivery(alert)
    }

    /// Returns false, logging why, when the registry rejects the alert.
    pub(crate) fn admits(&self, alert: &Alert) -> bool {
        match &self.registry {
            Some(registry) if !registry.exists(alert.name()) => {
                error!(alert = %alert.name(), "sending not registered alert");
                false
            }
            _ => true,
        }
    }

    fn spawn_delivery(&self, alert: Alert) -> Result<JoinHandle<DispatchOutcome>> {
        let Ok(runtime) = Handle::try_current() else {
            return Err(AlertError::NoRuntime {
                alert: alert.name().to_string(),
            });
        };

        let adapter = self.adapter.clone();
        let reserved = self.reserved_adapter.clone();
        Ok(runtime.spawn(deliver(adapter, reserved, alert)))
    }
}

async fn deliver(
    adapter: Option<Arc<dyn Adapter>>,
    reserved: Option<Arc<dyn Adapter>>,
    alert: Alert,
) -> DispatchOutcome {
    let Some(adapter) = adapter else {
        error!(
            alert = %alert.name(),
            error = %AlertError::AdapterNotInstalled,
            "error on send alert"
        );
        return DispatchOutcome::Failed;
    };

    match adapter.send(&alert).await {
        Ok(()) => {
            debug!(adapter = %adapter.name(), alert = %alert.name(), "alert delivered");
            return DispatchOutcome::Delivered {
                adapter: adapter.name().to_string(),
            };
        }
        Err(err) => error!(
            adapter = %adapter.name(),
            alert = %alert.name(),
            error = %err,
            "error on send alert by main adapter"
        ),
    }

    let Some(reserved) = reserved else {
        debug!(
            alert = %alert.name(),
            error = %AlertError::ReservedAdapterNotInstalled,
            "no fallback for alert"
        );
        return DispatchOutcome::Failed;
    };

    match reserved.send(&alert).await {
        Ok(()) => {
            debug!(adapter = %reserved.name(), alert = %alert.name(), "alert delivered by reserved adapter");
            DispatchOutcome::DeliveredByReserved {
                adapter: reserved.name().to_string(),
            }
        }
        Err(err) => {
            error!(
                adapter = %reserved.name(),
                alert = %alert.name(),
                error = %err,
                "error on send alert by reserved adapter"
            );
            DispatchOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::testing::RecordingAdapter;
    use crate::severity::Severity;
    use std::time::Duration;

    fn test_alert(name: &str) -> Alert {
        Alert::new(Severity::Critical, name, "summary", "description")
            .with_additional_label("team", "infra")
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn use_registry_is_idempotent() {
            let mut dispatcher = Dispatcher::without_adapter();
            dispatcher.register(test_alert("known")).unwrap();

            dispatcher.use_registry();

            assert!(dispatcher.registry().unwrap().exists("known"));
        }

        #[test]
        fn register_duplicate_is_fatal() {
            let mut dispatcher = Dispatcher::without_adapter();
            dispatcher.register(test_alert("known")).unwrap();

            let err = dispatcher.register(test_alert("known")).unwrap_err();
            assert!(err.is_fatal());
        }

        #[tokio::test]
        async fn unregistered_alert_never_reaches_adapters() {
            let primary = RecordingAdapter::succeeding("primary");
            let reserved = RecordingAdapter::succeeding("reserved");
            let mut dispatcher = Dispatcher::new(primary.clone());
            dispatcher.use_reserved_adapter(reserved.clone());
            dispatcher.register(test_alert("known")).unwrap();

            let outcome = dispatcher
                .dispatch_tracked(test_alert("unknown"))
                .unwrap()
                .await
                .unwrap();

            assert_eq!(outcome, DispatchOutcome::Dropped);
            assert_eq!(primary.calls(), 0);
            assert_eq!(reserved.calls(), 0);
        }

        #[tokio::test]
        async fn registered_alert_is_delivered() {
            let primary = RecordingAdapter::succeeding("primary");
            let mut dispatcher = Dispatcher::new(primary.clone());
            dispatcher.register(test_alert("known")).unwrap();

            let outcome = dispatcher
                .dispatch_tracked(test_alert("known"))
                .unwrap()
                .await
                .unwrap();

            assert!(outcome.is_delivered());
            assert_eq!(primary.calls(), 1);
        }
    }

    mod fallback_tests {
        use super::*;

        #[tokio::test]
        async fn primary_success_skips_reserved() {
            let primary = RecordingAdapter::succeeding("primary");
            let reserved = RecordingAdapter::succeeding("reserved");
            let mut dispatcher = Dispatcher::new(primary.clone());
            dispatcher.use_reserved_adapter(reserved.clone());

            let outcome = dispatcher
                .dispatch_tracked(test_alert("disk_full"))
                .unwrap()
                .await
                .unwrap();

            assert_eq!(
                outcome,
                DispatchOutcome::Delivered {
                    adapter: "primary".to_string()
                }
            );
            assert_eq!(primary.calls(), 1);
            assert_eq!(reserved.calls(), 0);
        }

        #[tokio::test]
        async fn primary_failure_falls_back_with_same_alert() {
            let primary = RecordingAdapter::failing("primary");
            let reserved = RecordingAdapter::succeeding("reserved");
            let mut dispatcher = Dispatcher::new(primary.clone());
            dispatcher.use_reserved_adapter(reserved.clone());
            let alert = test_alert("disk_full");

            let outcome = dispatcher
                .dispatch_tracked(alert.clone())
                .unwrap()
                .await
                .unwrap();

            assert_eq!(
                outcome,
                DispatchOutcome::DeliveredByReserved {
                    adapter: "reserved".to_string()
                }
            );
            assert_eq!(primary.received(), vec![alert.clone()]);
            assert_eq!(reserved.received(), vec![alert]);
        }

        #[tokio::test]
        async fn both_failing_is_terminal() {
            let primary = RecordingAdapter::failing("primary");
            let reserved = RecordingAdapter::failing("reserved");
            let mut dispatcher = Dispatcher::new(primary.clone());
            dispatcher.use_reserved_adapter(reserved.clone());

            let outcome = dispatcher
                .dispatch_tracked(test_alert("disk_full"))
                .unwrap()
                .await
                .unwrap();

            assert_eq!(outcome, DispatchOutcome::Failed);
            assert_eq!(primary.calls(), 1);
            assert_eq!(reserved.calls(), 1);
        }

        #[tokio::test]
        async fn primary_failure_without_reserved() {
            let primary = RecordingAdapter::failing("primary");
            let dispatcher = Dispatcher::new(primary.clone());

            let outcome = dispatcher
                .dispatch_tracked(test_alert("disk_full"))
                .unwrap()
                .await
                .unwrap();

            assert_eq!(outcome, DispatchOutcome::Failed);
            assert_eq!(primary.calls(), 1);
        }

        #[tokio::test]
        async fn missing_primary_does_not_promote_reserved() {
            let reserved = RecordingAdapter::succeeding("reserved");
            let mut dispatcher = Dispatcher::without_adapter();
            dispatcher.use_reserved_adapter(reserved.clone());

            let outcome = dispatcher
                .dispatch_tracked(test_alert("disk_full"))
                .unwrap()
                .await
                .unwrap();

            assert_eq!(outcome, DispatchOutcome::Failed);
            assert_eq!(reserved.calls(), 0);
        }

        #[tokio::test]
        async fn reserved_adapter_last_write_wins() {
            let primary = RecordingAdapter::failing("primary");
            let first = RecordingAdapter::succeeding("first");
            let second = RecordingAdapter::succeeding("second");
            let mut dispatcher = Dispatcher::new(primary);
            dispatcher.use_reserved_adapter(first.clone());
            dispatcher.use_reserved_adapter(second.clone());

            dispatcher
                .dispatch_tracked(test_alert("disk_full"))
                .unwrap()
                .await
                .unwrap();

            assert_eq!(first.calls(), 0);
            assert_eq!(second.calls(), 1);
        }
    }

    mod fire_and_forget_tests {
        use super::*;

        #[tokio::test]
        async fn dispatch_delivers_in_background() {
            let primary = RecordingAdapter::failing("primary");
            let (reserved, mut delivered) = RecordingAdapter::notifying("reserved");
            let mut dispatcher = Dispatcher::new(primary);
            dispatcher.use_reserved_adapter(reserved);
            let alert = test_alert("cert_expiring");

            dispatcher.dispatch(alert.clone());

            let received = tokio::time::timeout(Duration::from_secs(5), delivered.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(received, alert);
        }

        #[test]
        fn dispatch_outside_runtime_is_reported() {
            let dispatcher = Dispatcher::new(RecordingAdapter::succeeding("primary"));

            let err = dispatcher.dispatch_tracked(test_alert("x")).unwrap_err();
            assert!(matches!(err, AlertError::NoRuntime { .. }));

            // Must not panic.
            dispatcher.dispatch(test_alert("x"));
        }

        #[test]
        fn unregistered_alert_is_gated_before_runtime_lookup() {
            let primary = RecordingAdapter::succeeding("primary");
            let mut dispatcher = Dispatcher::new(primary.clone());
            dispatcher.register(test_alert("known")).unwrap();

            assert!(!dispatcher.admits(&test_alert("unknown")));
            assert!(dispatcher.admits(&test_alert("known")));

            // Dropped by the registry; no runtime is needed to get there.
            dispatcher.dispatch(test_alert("unknown"));
            assert_eq!(primary.calls(), 0);
        }
    }
}
