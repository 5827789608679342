use clap::Args;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSubscriberConfig {
    /// Chain connectivity is administratively turned off. Log-initiated jobs
    /// are accepted but not watched.
    pub eth_disabled: bool,
}

/// Parameters used to config the job subscriber.
#[derive(Debug, Clone, Args)]
pub struct JobSubscriberParams {
    /// Disable the connection to the chain. Jobs triggered by event logs will
    /// not run while this is set.
    #[arg(env = "HERALD_ETH_DISABLED", long)]
    pub eth_disabled: bool,
}

impl JobSubscriberParams {
    pub fn as_job_subscriber_config(&self) -> JobSubscriberConfig {
        JobSubscriberConfig { eth_disabled: self.eth_disabled }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        job_subscriber: JobSubscriberParams,
    }

    #[test]
    fn default_config_is_connected() {
        assert!(!JobSubscriberConfig::default().eth_disabled);
        let config: JobSubscriberConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, JobSubscriberConfig::default());
    }

    #[test]
    fn params_to_config() {
        let cli = TestCli::parse_from(["herald", "--eth-disabled"]);
        assert!(cli.job_subscriber.as_job_subscriber_config().eth_disabled);
    }
}
