use crate::{Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What triggers a job run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Initiator {
    /// An oracle request log emitted by an operator contract.
    RunLog {
        #[serde(default)]
        address: Option<Address>,
        /// Only requests from these contracts are accepted. Empty means any.
        #[serde(default)]
        requesters: Vec<Address>,
    },
    /// Any log matching the address and topics.
    EthLog {
        #[serde(default)]
        address: Option<Address>,
        #[serde(default)]
        topics: Vec<B256>,
    },
    /// A VRF randomness request log from the coordinator contract.
    RandomnessLog {
        #[serde(default)]
        address: Option<Address>,
    },
    Web,
    Cron {
        schedule: String,
    },
    RunAt {
        /// Unix timestamp, in seconds.
        at: u64,
    },
    External {
        name: String,
    },
    FluxMonitor {
        #[serde(default)]
        address: Option<Address>,
    },
}

impl Initiator {
    pub fn kind(&self) -> InitiatorKind {
        match self {
            Self::RunLog { .. } => InitiatorKind::RunLog,
            Self::EthLog { .. } => InitiatorKind::EthLog,
            Self::RandomnessLog { .. } => InitiatorKind::RandomnessLog,
            Self::Web => InitiatorKind::Web,
            Self::Cron { .. } => InitiatorKind::Cron,
            Self::RunAt { .. } => InitiatorKind::RunAt,
            Self::External { .. } => InitiatorKind::External,
            Self::FluxMonitor { .. } => InitiatorKind::FluxMonitor,
        }
    }

    pub fn is_log_driven(&self) -> bool {
        self.kind().is_log_driven()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitiatorKind {
    RunLog,
    EthLog,
    RandomnessLog,
    Web,
    Cron,
    RunAt,
    External,
    FluxMonitor,
}

impl InitiatorKind {
    /// Initiator kinds that need a live event log subscription.
    pub const LOG_DRIVEN: [InitiatorKind; 3] = [Self::RunLog, Self::EthLog, Self::RandomnessLog];

    pub fn is_log_driven(self) -> bool {
        Self::LOG_DRIVEN.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RunLog => "runlog",
            Self::EthLog => "ethlog",
            Self::RandomnessLog => "randomnesslog",
            Self::Web => "web",
            Self::Cron => "cron",
            Self::RunAt => "runat",
            Self::External => "external",
            Self::FluxMonitor => "fluxmonitor",
        }
    }
}

impl fmt::Display for InitiatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
