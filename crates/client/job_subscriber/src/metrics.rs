use hc_analytics::{register_counter_metric_instrument, register_gauge_metric_instrument};
use opentelemetry::metrics::{Counter, Gauge, Meter};
use opentelemetry::{global, InstrumentationScope, KeyValue};

pub struct JobSubscriberMetrics {
    pub subscriptions: Gauge<u64>,
    pub resumptions: Counter<u64>,
    pub resumption_failures: Counter<u64>,
}

impl JobSubscriberMetrics {
    pub fn register() -> Self {
        // Register meter
        let meter = global::meter_with_scope(
            InstrumentationScope::builder("crates.job_subscriber.opentelemetry")
                .with_attributes([KeyValue::new("crate", "job_subscriber")])
                .build(),
        );
        Self::with_meter(&meter)
    }

    pub fn with_meter(meter: &Meter) -> Self {
        let subscriptions = register_gauge_metric_instrument(
            meter,
            "job_subscriber_subscriptions".to_string(),
            "The number of job subscriptions currently active".to_string(),
            "subscription".to_string(),
        );

        let resumptions = register_counter_metric_instrument(
            meter,
            "job_subscriber_resumptions".to_string(),
            "Number of passes resuming runs pending confirmations".to_string(),
            "pass".to_string(),
        );

        let resumption_failures = register_counter_metric_instrument(
            meter,
            "job_subscriber_resumption_failures".to_string(),
            "Number of resumption passes which failed".to_string(),
            "pass".to_string(),
        );

        Self { subscriptions, resumptions, resumption_failures }
    }

    pub fn record_subscriptions(&self, count: usize) {
        self.subscriptions.record(count as u64, &[]);
    }
}
