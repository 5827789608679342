//! Logging and metrics setup for the Herald node.
//!
//! Logs always go to stdout through `tracing-subscriber`, filtered with
//! `RUST_LOG` (default `info`). Metrics are exported over OTLP when a
//! collection endpoint is configured; otherwise the global meter provider is
//! left as the no-op default and instruments cost nothing.

use opentelemetry::global;
use opentelemetry::metrics::{Counter, Gauge, Meter};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::Resource;
use std::fmt::Display;
use std::time::Duration;
use tracing_core::LevelFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;
use url::Url;

mod cli;

pub use cli::AnalyticsParams;

/// Interval at which metrics are pushed to the collector.
const EXPORT_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub service_name: String,
    pub collection_endpoint: Option<Url>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self { service_name: "Herald".into(), collection_endpoint: None }
    }
}

pub struct AnalyticsService {
    config: AnalyticsConfig,
    meter_provider: Option<SdkMeterProvider>,
}

impl AnalyticsService {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config, meter_provider: None }
    }

    /// Installs the global tracing subscriber and, if configured, the OTLP
    /// meter provider. Must be called once, from within a tokio runtime.
    pub fn setup(&mut self) -> anyhow::Result<()> {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env()?)
            .try_init()?;

        let Some(otel_endpoint) = &self.config.collection_endpoint else {
            tracing::debug!("No collection endpoint configured, metrics will not be exported");
            return Ok(());
        };

        let meter_provider = self.init_meter_provider(otel_endpoint)?;
        global::set_meter_provider(meter_provider.clone());
        self.meter_provider = Some(meter_provider);
        tracing::info!("📈 Exporting metrics to {otel_endpoint}");

        Ok(())
    }

    fn init_meter_provider(&self, otel_endpoint: &Url) -> anyhow::Result<SdkMeterProvider> {
        let exporter =
            opentelemetry_otlp::MetricExporter::builder().with_tonic().with_endpoint(otel_endpoint.as_str()).build()?;

        let reader = PeriodicReader::builder(exporter).with_interval(EXPORT_INTERVAL).build();

        Ok(SdkMeterProvider::builder()
            .with_reader(reader)
            .with_resource(
                Resource::builder().with_service_name(format!("{}{}", self.config.service_name, "_meter_service")).build(),
            )
            .build())
    }

    pub fn is_exporting(&self) -> bool {
        self.meter_provider.is_some()
    }

    /// Flushes and shuts down the meter provider, if any.
    pub fn shutdown(&mut self) -> anyhow::Result<()> {
        if let Some(provider) = self.meter_provider.take() {
            provider.shutdown()?;
        }
        Ok(())
    }
}

pub trait GaugeType<T> {
    fn register_gauge(meter: &Meter, name: String, description: String, unit: String) -> Gauge<T>;
}

impl GaugeType<f64> for f64 {
    fn register_gauge(meter: &Meter, name: String, description: String, unit: String) -> Gauge<f64> {
        meter.f64_gauge(name).with_description(description).with_unit(unit).build()
    }
}
impl GaugeType<u64> for u64 {
    fn register_gauge(meter: &Meter, name: String, description: String, unit: String) -> Gauge<u64> {
        meter.u64_gauge(name).with_description(description).with_unit(unit).build()
    }
}

pub fn register_gauge_metric_instrument<T: GaugeType<T> + Display>(
    crate_meter: &Meter,
    instrument_name: String,
    desc: String,
    unit: String,
) -> Gauge<T> {
    T::register_gauge(crate_meter, instrument_name, desc, unit)
}

pub trait CounterType<T> {
    fn register_counter(meter: &Meter, name: String, description: String, unit: String) -> Counter<T>;
}

impl CounterType<u64> for u64 {
    fn register_counter(meter: &Meter, name: String, description: String, unit: String) -> Counter<u64> {
        meter.u64_counter(name).with_description(description).with_unit(unit).build()
    }
}
impl CounterType<f64> for f64 {
    fn register_counter(meter: &Meter, name: String, description: String, unit: String) -> Counter<f64> {
        meter.f64_counter(name).with_description(description).with_unit(unit).build()
    }
}

pub fn register_counter_metric_instrument<T: CounterType<T> + Display>(
    crate_meter: &Meter,
    instrument_name: String,
    desc: String,
    unit: String,
) -> Counter<T> {
    T::register_counter(crate_meter, instrument_name, desc, unit)
}
