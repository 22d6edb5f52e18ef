//! Prometheus Alertmanager adapter.
//!
//! Alerts are POSTed to `<url>/api/v2/alerts` as a one-element JSON array in
//! the Alertmanager v2 format. Each attempt carries a fresh `alertID` label;
//! delivery is retried up to the configured attempt budget.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::adapter::{Adapter, SendFuture};
use crate::alert::{Alert, AlertContext};
use crate::config::PrometheusConfig;
use crate::error::{AlertError, Result};
use crate::transport::{AlertTransport, ReqwestTransport, Sleeper, TokioSleeper};

/// Path appended to the configured base URL.
pub const ALERTS_PATH: &str = "/api/v2/alerts";
/// Value of the `sender` label on every alert.
pub const SENDER: &str = "AlertManagerClient";

/// One alert in the Alertmanager v2 `postableAlerts` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostableAlert {
    /// RFC 3339 creation timestamp.
    pub starts_at: String,
    /// Summary, description and additional annotations.
    pub annotations: BTreeMap<String, String>,
    /// Standard labels plus additional labels.
    pub labels: BTreeMap<String, String>,
}

/// Delivers alerts to a Prometheus Alertmanager.
#[derive(Debug, Clone)]
pub struct PrometheusAdapter {
    config: PrometheusConfig,
    send_url: String,
    context: AlertContext,
    transport: Arc<dyn AlertTransport>,
    sleeper: Arc<dyn Sleeper>,
}

impl PrometheusAdapter {
    /// Adapter name.
    pub const NAME: &'static str = "prometheus";

    /// Creates an adapter using `reqwest` and `tokio` timers.
    #[must_use]
    pub fn new(config: PrometheusConfig, context: AlertContext) -> Self {
        Self::with_transport(
            config,
            context,
            Arc::new(ReqwestTransport::new()),
            Arc::new(TokioSleeper),
        )
    }

    /// Creates an adapter with explicit I/O seams.
    #[must_use]
    pub fn with_transport(
        config: PrometheusConfig,
        context: AlertContext,
        transport: Arc<dyn AlertTransport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let send_url = format!("{}{ALERTS_PATH}", config.url.trim_end_matches('/'));
        Self {
            config,
            send_url,
            context,
            transport,
            sleeper,
        }
    }

    /// The full URL alerts are POSTed to.
    #[must_use]
    pub fn send_url(&self) -> &str {
        &self.send_url
    }

    /// The adapter configuration.
    #[must_use]
    pub const fn config(&self) -> &PrometheusConfig {
        &self.config
    }

    /// Builds the payload for one attempt, with a fresh `alertID`.
    #[must_use]
    pub fn build_payload(&self, alert: &Alert) -> Vec<PostableAlert> {
        let mut annotations = BTreeMap::from([
            ("summary".to_string(), alert.summary().to_string()),
            ("description".to_string(), alert.description().to_string()),
        ]);
        annotations.extend(
            alert
                .additional_annotations()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        let mut labels = BTreeMap::from([
            ("alertname".to_string(), alert.name().to_string()),
            ("code".to_string(), alert.code().to_string()),
            ("severity".to_string(), alert.severity().as_str().to_string()),
            ("project".to_string(), self.context.project.clone()),
            ("service".to_string(), self.context.service.clone()),
            ("instance".to_string(), self.context.instance.clone()),
            ("sender".to_string(), SENDER.to_string()),
            ("alertID".to_string(), Uuid::new_v4().to_string()),
        ]);
        labels.extend(
            alert
                .additional_labels()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        vec![PostableAlert {
            starts_at: alert.date().to_rfc3339_opts(SecondsFormat::AutoSi, true),
            annotations,
            labels,
        }]
    }

    async fn attempt(&self, alert: &Alert) -> Result<()> {
        let body = serde_json::to_vec(&self.build_payload(alert))?;
        let response = self.transport.post_json(&self.send_url, body).await?;

        if response.status != 200 {
            return Err(AlertError::UnexpectedStatus {
                status: response.status,
                body: response.body,
            });
        }

        Ok(())
    }

    async fn deliver(&self, alert: &Alert) -> Result<()> {
        if self.config.is_demo {
            info!(
                adapter = Self::NAME,
                alert = %alert.name(),
                "alert was successfully sent in demo mode"
            );
            return Ok(());
        }

        let attempts = self.config.attempts.max(1);
        for attempt in 1..=attempts {
            match self.attempt(alert).await {
                Ok(()) => {
                    info!(adapter = Self::NAME, alert = %alert.name(), attempt, "alert sent");
                    return Ok(());
                }
                Err(err) => {
                    error!(
                        adapter = Self::NAME,
                        alert = %alert.name(),
                        attempt,
                        error = %err,
                        "attempt to send alert failed"
                    );
                }
            }

            if attempt != attempts {
                self.sleeper.sleep(self.config.interval).await;
            }
        }

        error!(adapter = Self::NAME, alert = %alert.name(), attempts, "giving up on alert");
        Err(AlertError::AttemptsExceeded {
            adapter: Self::NAME.to_string(),
            alert: alert.name().to_string(),
        })
    }
}

impl Adapter for PrometheusAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn send<'a>(&'a self, alert: &'a Alert) -> SendFuture<'a> {
        Box::pin(self.deliver(alert))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;
    use crate::transport::{BoxFuture, TransportResponse};
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Replays scripted responses and records every request.
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<TransportResponse>>>,
        fallback_status: u16,
        requests: Mutex<Vec<(String, serde_json::Value)>>,
    }

    impl ScriptedTransport {
        fn always(status: u16) -> Arc<Self> {
            Arc::new(Self {
                fallback_status: status,
                ..Self::default()
            })
        }

        fn scripted(responses: Vec<Result<TransportResponse>>, then: u16) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                fallback_status: then,
                ..Self::default()
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().len()
        }

        fn bodies(&self) -> Vec<serde_json::Value> {
            self.requests.lock().iter().map(|(_, b)| b.clone()).collect()
        }
    }

    impl AlertTransport for ScriptedTransport {
        fn post_json<'a>(
            &'a self,
            url: &'a str,
            body: Vec<u8>,
        ) -> BoxFuture<'a, Result<TransportResponse>> {
            Box::pin(async move {
                let json: serde_json::Value = serde_json::from_slice(&body)?;
                self.requests.lock().push((url.to_string(), json));
                self.responses.lock().pop_front().unwrap_or_else(|| {
                    Ok(TransportResponse {
                        status: self.fallback_status,
                        body: format!("status {}", self.fallback_status),
                    })
                })
            })
        }
    }

    #[derive(Debug, Default)]
    struct RecordingSleeper {
        sleeps: Mutex<Vec<Duration>>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
            self.sleeps.lock().push(duration);
            Box::pin(async {})
        }
    }

    fn context() -> AlertContext {
        AlertContext::new("neon", "indexer", "node-7")
    }

    fn config(attempts: u32) -> PrometheusConfig {
        PrometheusConfig::new("http://alertmanager:9093/")
            .unwrap()
            .with_attempts(attempts)
            .with_interval(Duration::from_millis(300))
    }

    fn adapter(
        config: PrometheusConfig,
        transport: Arc<ScriptedTransport>,
        sleeper: Arc<RecordingSleeper>,
    ) -> PrometheusAdapter {
        PrometheusAdapter::with_transport(config, context(), transport, sleeper)
    }

    fn test_alert() -> Alert {
        Alert::new(Severity::Error, "indexer_lag", "indexer is lagging", "lag > 100 blocks")
            .with_code("IDX-1")
    }

    mod payload_tests {
        use super::*;

        #[test]
        fn send_url_joins_base_and_path() {
            let adapter = adapter(config(1), ScriptedTransport::always(200), Arc::default());
            assert_eq!(adapter.send_url(), "http://alertmanager:9093/api/v2/alerts");
        }

        #[test]
        fn payload_has_standard_labels_and_annotations() {
            let adapter = adapter(config(1), ScriptedTransport::always(200), Arc::default());
            let alert = test_alert();

            let payload = adapter.build_payload(&alert);

            assert_eq!(payload.len(), 1);
            let item = &payload[0];
            assert_eq!(item.labels["alertname"], "indexer_lag");
            assert_eq!(item.labels["code"], "IDX-1");
            assert_eq!(item.labels["severity"], "error");
            assert_eq!(item.labels["project"], "neon");
            assert_eq!(item.labels["service"], "indexer");
            assert_eq!(item.labels["instance"], "node-7");
            assert_eq!(item.labels["sender"], SENDER);
            assert!(Uuid::parse_str(&item.labels["alertID"]).is_ok());
            assert_eq!(item.annotations["summary"], "indexer is lagging");
            assert_eq!(item.annotations["description"], "lag > 100 blocks");
            assert_eq!(
                chrono::DateTime::parse_from_rfc3339(&item.starts_at).unwrap(),
                alert.date()
            );
        }

        #[test]
        fn additional_label_is_merged_without_dropping_standard_ones() {
            let adapter = adapter(config(1), ScriptedTransport::always(200), Arc::default());
            let alert = test_alert().with_additional_label("team", "infra");

            let json = serde_json::to_value(adapter.build_payload(&alert)).unwrap();
            let labels = json[0]["labels"].as_object().unwrap();

            assert_eq!(labels["team"], "infra");
            for key in [
                "alertname", "code", "severity", "project", "service", "instance", "sender",
                "alertID",
            ] {
                assert!(labels.contains_key(key), "missing label {key}");
            }
            assert_eq!(labels.len(), 9);
        }

        #[test]
        fn additional_entries_win_on_collision() {
            let adapter = adapter(config(1), ScriptedTransport::always(200), Arc::default());
            let alert = test_alert()
                .with_additional_label("severity", "page")
                .with_additional_annotation("summary", "overridden");

            let payload = adapter.build_payload(&alert);

            assert_eq!(payload[0].labels["severity"], "page");
            assert_eq!(payload[0].annotations["summary"], "overridden");
            assert_eq!(payload[0].annotations["description"], "lag > 100 blocks");
        }

        #[test]
        fn payload_uses_camel_case_starts_at() {
            let adapter = adapter(config(1), ScriptedTransport::always(200), Arc::default());
            let json = serde_json::to_value(adapter.build_payload(&test_alert())).unwrap();

            assert!(json.is_array());
            assert!(json[0].get("startsAt").is_some());
        }

        #[test]
        fn each_payload_gets_a_new_alert_id() {
            let adapter = adapter(config(1), ScriptedTransport::always(200), Arc::default());
            let alert = test_alert();

            let first = adapter.build_payload(&alert);
            let second = adapter.build_payload(&alert);

            assert_ne!(first[0].labels["alertID"], second[0].labels["alertID"]);
        }
    }

    mod delivery_tests {
        use super::*;
        use tracing_subscriber::layer::{Context, SubscriberExt};
        use tracing_subscriber::Layer;

        #[tokio::test]
        async fn demo_mode_never_touches_transport() {
            let transport = ScriptedTransport::always(500);
            let sleeper = Arc::new(RecordingSleeper::default());
            let adapter = adapter(config(3).demo(true), Arc::clone(&transport), Arc::clone(&sleeper));

            adapter.send(&test_alert()).await.unwrap();

            assert_eq!(transport.calls(), 0);
            assert!(sleeper.sleeps.lock().is_empty());
        }

        #[tokio::test]
        async fn success_on_first_attempt() {
            let transport = ScriptedTransport::always(200);
            let sleeper = Arc::new(RecordingSleeper::default());
            let adapter = adapter(config(3), Arc::clone(&transport), Arc::clone(&sleeper));

            adapter.send(&test_alert()).await.unwrap();

            assert_eq!(transport.calls(), 1);
            assert!(sleeper.sleeps.lock().is_empty());
            let (url, _) = transport.requests.lock()[0].clone();
            assert_eq!(url, "http://alertmanager:9093/api/v2/alerts");
        }

        #[tokio::test]
        async fn always_500_exhausts_attempts() {
            let transport = ScriptedTransport::always(500);
            let sleeper = Arc::new(RecordingSleeper::default());
            let adapter = adapter(config(3), Arc::clone(&transport), Arc::clone(&sleeper));

            let err = adapter.send(&test_alert()).await.unwrap_err();

            assert_eq!(transport.calls(), 3);
            assert_eq!(
                *sleeper.sleeps.lock(),
                vec![Duration::from_millis(300), Duration::from_millis(300)]
            );
            assert!(
                matches!(err, AlertError::AttemptsExceeded { ref alert, .. } if alert == "indexer_lag")
            );
            assert!(err.to_string().contains("indexer_lag"));
        }

        #[derive(Clone, Default)]
        struct LevelLog(Arc<Mutex<Vec<tracing::Level>>>);

        impl<S: tracing::Subscriber> Layer<S> for LevelLog {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                self.0.lock().push(*event.metadata().level());
            }
        }

        #[tokio::test]
        async fn failed_attempts_are_logged_as_errors() {
            let log = LevelLog::default();
            let _guard =
                tracing::subscriber::set_default(tracing_subscriber::registry().with(log.clone()));
            let transport = ScriptedTransport::always(500);
            let adapter = adapter(config(2), transport, Arc::default());

            adapter.send(&test_alert()).await.unwrap_err();

            let levels = log.0.lock();
            // Two failed attempts plus the final give-up.
            assert_eq!(
                levels.iter().filter(|l| **l == tracing::Level::ERROR).count(),
                3
            );
            assert!(!levels.contains(&tracing::Level::WARN));
        }

        #[tokio::test]
        async fn only_status_200_counts_as_success() {
            let transport = ScriptedTransport::always(202);
            let adapter = adapter(config(2), Arc::clone(&transport), Arc::default());

            assert!(adapter.send(&test_alert()).await.is_err());
            assert_eq!(transport.calls(), 2);
        }

        #[tokio::test]
        async fn recovers_after_transport_error() {
            let transport = ScriptedTransport::scripted(
                vec![
                    Err(AlertError::Transport {
                        reason: "connection reset".to_string(),
                    }),
                    Ok(TransportResponse {
                        status: 503,
                        body: "busy".to_string(),
                    }),
                ],
                200,
            );
            let sleeper = Arc::new(RecordingSleeper::default());
            let adapter = adapter(config(5), Arc::clone(&transport), Arc::clone(&sleeper));

            adapter.send(&test_alert()).await.unwrap();

            assert_eq!(transport.calls(), 3);
            assert_eq!(sleeper.sleeps.lock().len(), 2);
        }

        #[tokio::test]
        async fn alert_id_differs_per_attempt() {
            let transport = ScriptedTransport::always(500);
            let adapter = adapter(config(2), Arc::clone(&transport), Arc::default());

            let _ = adapter.send(&test_alert()).await;

            let bodies = transport.bodies();
            assert_eq!(bodies.len(), 2);
            assert_ne!(bodies[0][0]["labels"]["alertID"], bodies[1][0]["labels"]["alertID"]);
        }
    }
}
