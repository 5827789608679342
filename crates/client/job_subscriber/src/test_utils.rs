//! In-memory collaborators shared by the unit tests.

use crate::client::RunManager;
use crate::transport::{LogSubscription, SubscriptionTransport};
use hp_job::{ChainHead, Initiator, JobId, JobSpec, B256, U256};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub fn chain_head(number: u64) -> ChainHead {
    let hash = B256::from(U256::from(number).to_be_bytes::<32>());
    let parent_hash = B256::from(U256::from(number.saturating_sub(1)).to_be_bytes::<32>());
    ChainHead::new(number, hash, parent_hash)
}

pub fn runlog_job(name: &str) -> JobSpec {
    JobSpec::new(name, vec![Initiator::RunLog { address: None, requesters: vec![] }])
}

pub fn ethlog_job(name: &str) -> JobSpec {
    JobSpec::new(name, vec![Initiator::Web, Initiator::EthLog { address: None, topics: vec![] }])
}

struct FakeSubscription {
    job_id: JobId,
    unsubscribed: Arc<Mutex<HashMap<JobId, usize>>>,
}

impl LogSubscription for FakeSubscription {
    fn unsubscribe(self: Box<Self>) {
        *self.unsubscribed.lock().unwrap().entry(self.job_id).or_default() += 1;
    }
}

/// Records every watch it opens and every unsubscribe call.
#[derive(Default)]
pub struct FakeTransport {
    /// Jobs for which opening a watch fails.
    failing: HashSet<JobId>,
    /// Suspends once inside `subscribe`, letting other tasks run.
    yield_on_subscribe: bool,
    /// When set, `subscribe` waits for a permit before returning.
    gate: Option<Arc<Semaphore>>,
    calls: Mutex<Vec<(JobId, Option<ChainHead>)>>,
    unsubscribed: Arc<Mutex<HashMap<JobId, usize>>>,
}

impl FakeTransport {
    pub fn failing(jobs: impl IntoIterator<Item = JobId>) -> Self {
        Self { failing: jobs.into_iter().collect(), ..Default::default() }
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self { gate: Some(gate), ..Default::default() }
    }

    pub fn yielding() -> Self {
        Self { yield_on_subscribe: true, ..Default::default() }
    }

    pub fn subscribe_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn subscribed_heads(&self, job_id: &JobId) -> Vec<Option<ChainHead>> {
        self.calls.lock().unwrap().iter().filter(|(id, _)| id == job_id).map(|(_, head)| *head).collect()
    }

    pub fn unsubscribe_count(&self, job_id: &JobId) -> usize {
        self.unsubscribed.lock().unwrap().get(job_id).copied().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl SubscriptionTransport for FakeTransport {
    async fn subscribe(&self, job: &JobSpec, head: Option<ChainHead>) -> anyhow::Result<Box<dyn LogSubscription>> {
        self.calls.lock().unwrap().push((job.id, head));
        if self.yield_on_subscribe {
            tokio::task::yield_now().await;
        }
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.failing.contains(&job.id) {
            anyhow::bail!("connection refused");
        }
        Ok(Box::new(FakeSubscription { job_id: job.id, unsubscribed: Arc::clone(&self.unsubscribed) }))
    }
}

/// Records the head of every resumption pass. Passes can be held back with
/// `gate` to observe coalescing.
#[derive(Default)]
pub struct RecordingRunManager {
    gate: Option<Arc<Semaphore>>,
    /// Fail every pass with this message.
    fail_with: Option<&'static str>,
    heads: Mutex<Vec<ChainHead>>,
}

impl RecordingRunManager {
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self { gate: Some(gate), ..Default::default() }
    }

    pub fn failing(message: &'static str) -> Self {
        Self { fail_with: Some(message), ..Default::default() }
    }

    pub fn resumed_at(&self) -> Vec<ChainHead> {
        self.heads.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RunManager for RecordingRunManager {
    async fn resume_all_pending_at(&self, head: &ChainHead) -> anyhow::Result<()> {
        self.heads.lock().unwrap().push(*head);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        match self.fail_with {
            Some(message) => Err(anyhow::anyhow!(message)),
            None => Ok(()),
        }
    }
}
