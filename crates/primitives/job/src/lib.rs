//! Job primitives shared by the Herald node.
//!
//! A job is an off-chain pipeline triggered by on-chain activity. This crate
//! only holds the plain data the node passes around: the job specification
//! and its initiators, the chain head used as a freshness token when resuming
//! paused runs. Hashes, addresses and integers are `alloy-primitives` types.

mod head;
mod initiator;
mod job_id;
pub mod vrf;

pub use alloy_primitives::{Address, B256, U256};
pub use head::ChainHead;
pub use initiator::{Initiator, InitiatorKind};
pub use job_id::JobId;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid job id '{input}': {source}")]
    JobId { input: String, source: uuid::Error },
}

fn default_enabled() -> bool {
    true
}

/// A stored job specification.
///
/// The node treats this as immutable input: subscribers only look at the id,
/// the initiators and the `enabled` flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub id: JobId,
    #[serde(default)]
    pub name: String,
    pub initiators: Vec<Initiator>,
    /// Archived or paused jobs are kept in storage but never watched.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl JobSpec {
    pub fn new(name: impl Into<String>, initiators: Vec<Initiator>) -> Self {
        Self { id: JobId::new_random(), name: name.into(), initiators, enabled: true }
    }

    /// Whether this job is triggered by on-chain event logs, and therefore
    /// needs a live log subscription.
    pub fn is_log_initiated(&self) -> bool {
        self.initiators.iter().any(Initiator::is_log_driven)
    }

    pub fn has_initiator_of(&self, kinds: &[InitiatorKind]) -> bool {
        self.initiators.iter().any(|initiator| kinds.contains(&initiator.kind()))
    }

    pub fn log_initiators(&self) -> impl Iterator<Item = &Initiator> {
        self.initiators.iter().filter(|initiator| initiator.is_log_driven())
    }
}
