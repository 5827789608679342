use crate::AnalyticsConfig;
use clap::Args;
use url::Url;

/// Parameters used to config analytics.
#[derive(Debug, Clone, Args)]
pub struct AnalyticsParams {
    /// Name of the service.
    #[arg(env = "HERALD_ANALYTICS_SERVICE_NAME", long, alias = "analytics", default_value = "herald_analytics")]
    pub analytics_service_name: String,

    /// Endpoint of the analytics server.
    #[arg(env = "OTEL_EXPORTER_OTLP_ENDPOINT", long, default_value = None)]
    pub analytics_collection_endpoint: Option<Url>,
}

impl AnalyticsParams {
    pub fn as_analytics_config(&self) -> AnalyticsConfig {
        AnalyticsConfig {
            service_name: self.analytics_service_name.clone(),
            collection_endpoint: self.analytics_collection_endpoint.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        analytics: AnalyticsParams,
    }

    #[test]
    fn parse_endpoint() {
        let cli = TestCli::parse_from([
            "herald",
            "--analytics-service-name",
            "oracle",
            "--analytics-collection-endpoint",
            "http://localhost:4317",
        ]);
        let config = cli.analytics.as_analytics_config();
        assert_eq!(config.service_name, "oracle");
        assert_eq!(config.collection_endpoint.unwrap().as_str(), "http://localhost:4317/");
    }
}
