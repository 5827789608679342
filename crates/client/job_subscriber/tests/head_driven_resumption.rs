use hc_job_subscriber::{
    HeadTrackable, JobStore, JobSubscriberConfig, LogSubscription, RunManager, SubscriptionRegistry,
    SubscriptionState, SubscriptionTransport,
};
use hp_job::{ChainHead, Initiator, InitiatorKind, JobId, JobSpec, B256};
use hp_utils::service::ServiceContext;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn head(number: u64) -> ChainHead {
    ChainHead::new(number, B256::repeat_byte(number as u8), B256::repeat_byte(number.saturating_sub(1) as u8))
}

fn log_job(name: &str) -> JobSpec {
    JobSpec::new(name, vec![Initiator::RunLog { address: None, requesters: vec![] }])
}

#[derive(Default)]
struct Transport {
    unsubscribed: Arc<Mutex<HashMap<JobId, usize>>>,
}

struct Watch {
    job_id: JobId,
    unsubscribed: Arc<Mutex<HashMap<JobId, usize>>>,
}

impl LogSubscription for Watch {
    fn unsubscribe(self: Box<Self>) {
        *self.unsubscribed.lock().unwrap().entry(self.job_id).or_default() += 1;
    }
}

#[async_trait::async_trait]
impl SubscriptionTransport for Transport {
    async fn subscribe(&self, job: &JobSpec, _head: Option<ChainHead>) -> anyhow::Result<Box<dyn LogSubscription>> {
        Ok(Box::new(Watch { job_id: job.id, unsubscribed: Arc::clone(&self.unsubscribed) }))
    }
}

struct Store(Vec<JobSpec>);

impl JobStore for Store {
    fn jobs_with_initiators(&self, kinds: &[InitiatorKind]) -> anyhow::Result<Vec<JobSpec>> {
        Ok(self.0.iter().filter(|job| job.has_initiator_of(kinds)).cloned().collect())
    }

    fn upsert_error_for(&self, job_id: &JobId, description: &str) -> anyhow::Result<()> {
        anyhow::bail!("unexpected job error for {job_id}: {description}")
    }
}

#[derive(Default)]
struct Runs(Mutex<Vec<ChainHead>>);

#[async_trait::async_trait]
impl RunManager for Runs {
    async fn resume_all_pending_at(&self, head: &ChainHead) -> anyhow::Result<()> {
        self.0.lock().unwrap().push(*head);
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn remove_then_resume_at_freshest_head() {
    let a = log_job("a");
    let b = log_job("b");
    let web = JobSpec::new("web", vec![Initiator::Web]);

    let transport = Arc::new(Transport::default());
    let runs = Arc::new(Runs::default());
    let ctx = ServiceContext::new();
    let registry = SubscriptionRegistry::new(
        JobSubscriberConfig::default(),
        Arc::clone(&transport) as _,
        Arc::new(Store(vec![a.clone(), b.clone(), web])),
        Arc::clone(&runs) as _,
        &ctx,
    );

    registry.connect(Some(head(100))).await.unwrap();
    assert_eq!(registry.len(), 2);

    registry.remove_job(&a.id).unwrap();
    assert_eq!(registry.jobs(), vec![b.clone()]);
    assert_eq!(transport.unsubscribed.lock().unwrap().get(&a.id), Some(&1));
    assert_eq!(registry.subscription_state(&a.id), SubscriptionState::Absent);

    registry.on_new_head(head(105));
    registry.on_new_head(head(106));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(*runs.0.lock().unwrap(), vec![head(106)]);

    registry.shutdown().await.unwrap();
    assert!(registry.jobs().is_empty());
    assert_eq!(transport.unsubscribed.lock().unwrap().get(&a.id), Some(&1));
    assert_eq!(transport.unsubscribed.lock().unwrap().get(&b.id), Some(&1));

    registry.on_new_head(head(107));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(*runs.0.lock().unwrap(), vec![head(106)]);
}

#[tokio::test(start_paused = true)]
async fn cancelling_the_node_stops_resumption() {
    let runs = Arc::new(Runs::default());
    let ctx = ServiceContext::new();
    let registry = SubscriptionRegistry::new(
        JobSubscriberConfig::default(),
        Arc::new(Transport::default()),
        Arc::new(Store(vec![])),
        Arc::clone(&runs) as _,
        &ctx,
    );

    ctx.cancel_global();
    tokio::time::sleep(Duration::from_secs(1)).await;

    registry.on_new_head(head(1));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(runs.0.lock().unwrap().is_empty());

    registry.shutdown().await.unwrap();
}
