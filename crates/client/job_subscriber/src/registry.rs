use crate::{
    client::{JobStore, RunManager},
    error::{JobSubscriberError, ReconcileErrors},
    head::HeadState,
    metrics::JobSubscriberMetrics,
    transport::{JobSubscription, SubscriptionTransport},
    worker::ResumptionWorker,
    JobSubscriberConfig,
};
use hp_job::{ChainHead, JobId, JobSpec};
use hp_utils::{service::ServiceContext, SingleFlightWaker};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// Error description recorded against a job whose watch could not be opened.
pub const SUBSCRIPTION_START_ERROR: &str = "Unable to start job subscription";

/// Where a job currently stands in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscriptionState {
    Absent,
    /// An [SubscriptionRegistry::add_job] call is opening the watch.
    Subscribing,
    Active,
}

#[derive(Default)]
struct Subscriptions {
    active: HashMap<JobId, JobSubscription>,
    /// Jobs whose watch is being opened. Kept apart from `active` so that a
    /// job is only ever mapped to a live watch.
    subscribing: HashSet<JobId>,
    shutting_down: bool,
}

/// Holds the event log watches of every log-initiated job, and resumes runs
/// pending confirmations when new heads arrive.
///
/// The internal lock is never held while talking to the transport: watches
/// are opened before a job is registered and closed after it is removed.
pub struct SubscriptionRegistry {
    config: JobSubscriberConfig,
    transport: Arc<dyn SubscriptionTransport>,
    store: Arc<dyn JobStore>,
    inner: RwLock<Subscriptions>,
    head: Arc<HeadState>,
    resumer: SingleFlightWaker,
    metrics: Arc<JobSubscriberMetrics>,
}

impl SubscriptionRegistry {
    /// Creates the registry and spawns its resumption worker under `ctx`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        config: JobSubscriberConfig,
        transport: Arc<dyn SubscriptionTransport>,
        store: Arc<dyn JobStore>,
        run_manager: Arc<dyn RunManager>,
        ctx: &ServiceContext,
    ) -> Self {
        let metrics = Arc::new(JobSubscriberMetrics::register());
        Self::with_metrics(config, transport, store, run_manager, metrics, ctx)
    }

    /// Same as [SubscriptionRegistry::new], recording to the given instruments.
    pub fn with_metrics(
        config: JobSubscriberConfig,
        transport: Arc<dyn SubscriptionTransport>,
        store: Arc<dyn JobStore>,
        run_manager: Arc<dyn RunManager>,
        metrics: Arc<JobSubscriberMetrics>,
        ctx: &ServiceContext,
    ) -> Self {
        let head = Arc::new(HeadState::default());
        let worker = ResumptionWorker::new(run_manager, Arc::clone(&head), Arc::clone(&metrics));
        let resumer = SingleFlightWaker::new(worker, ctx);

        Self { config, transport, store, inner: RwLock::new(Subscriptions::default()), head, resumer, metrics }
    }

    /// Starts watching event logs for `job`.
    ///
    /// Jobs which are not log-initiated, disabled jobs, and every job while
    /// chain connectivity is disabled are accepted without opening a watch.
    /// Adding a job which is already watched is a no-op.
    #[tracing::instrument(skip(self, job), fields(job_id = %job.id))]
    pub async fn add_job(&self, job: JobSpec, head: Option<ChainHead>) -> Result<(), JobSubscriberError> {
        if !job.is_log_initiated() {
            return Ok(());
        }
        if !job.enabled {
            tracing::debug!("Job is disabled, not subscribing to event logs");
            return Ok(());
        }
        if self.config.eth_disabled {
            tracing::warn!(
                "ACTION REQUIRED: Attempted to add job with name '{}' but Ethereum was disabled. This job is NOT running.",
                job.name
            );
            return Ok(());
        }

        let Some(reservation) = self.reserve(job.id)? else {
            tracing::warn!("Job subscription already added");
            return Ok(());
        };

        let inner = match self.transport.subscribe(&job, head).await {
            Ok(inner) => inner,
            Err(source) => {
                drop(reservation);
                if let Err(err) = self.store.upsert_error_for(&job.id, SUBSCRIPTION_START_ERROR) {
                    tracing::warn!("Failed to record job error: {err:#}");
                }
                return Err(JobSubscriberError::Transport { job_id: job.id, source });
            }
        };

        match reservation.commit(JobSubscription::new(job, inner)) {
            Ok(count) => {
                tracing::debug!(subscriptions = count, "Subscribed to event logs");
                Ok(())
            }
            Err(subscription) => {
                subscription.unsubscribe();
                Err(JobSubscriberError::ShuttingDown)
            }
        }
    }

    /// Stops watching event logs for `job_id`.
    #[tracing::instrument(skip(self))]
    pub fn remove_job(&self, job_id: &JobId) -> Result<(), JobSubscriberError> {
        let subscription = {
            let mut inner = self.inner.write().expect("subscriptions lock poisoned");
            let subscription = inner.active.remove(job_id).ok_or(JobSubscriberError::NotFound(*job_id))?;
            // Recorded under the lock so concurrent changes record in order.
            self.metrics.record_subscriptions(inner.active.len());
            subscription
        };

        subscription.unsubscribe();
        Ok(())
    }

    /// Snapshot of the jobs currently watched, in no particular order.
    pub fn jobs(&self) -> Vec<JobSpec> {
        let inner = self.inner.read().expect("subscriptions lock poisoned");
        inner.active.values().map(|subscription| subscription.job().clone()).collect()
    }

    /// Adds every job in `jobs`, collecting failures instead of stopping at the
    /// first one.
    pub async fn reconcile(
        &self,
        jobs: impl IntoIterator<Item = JobSpec>,
        head: Option<ChainHead>,
    ) -> Result<(), JobSubscriberError> {
        let mut errors = ReconcileErrors::default();
        for job in jobs {
            let job_id = job.id;
            if let Err(err) = self.add_job(job, head).await {
                errors.push(job_id, err);
            }
        }

        if !errors.is_empty() {
            tracing::warn!("{errors}");
        }
        errors.into_result()
    }

    /// Unsubscribes every watch and stops the resumption worker, waiting for an
    /// in-flight pass to complete.
    ///
    /// No watch is registered once this has been called.
    pub async fn shutdown(&self) -> Result<(), JobSubscriberError> {
        let subscriptions: Vec<_> = {
            let mut inner = self.inner.write().expect("subscriptions lock poisoned");
            inner.shutting_down = true;
            self.metrics.record_subscriptions(0);
            inner.active.drain().map(|(_, subscription)| subscription).collect()
        };

        tracing::debug!("Unsubscribing {} job subscription(s)", subscriptions.len());
        for subscription in subscriptions {
            subscription.unsubscribe();
        }

        self.resumer.stop().await?;
        Ok(())
    }

    pub fn subscription_state(&self, job_id: &JobId) -> SubscriptionState {
        let inner = self.inner.read().expect("subscriptions lock poisoned");
        if inner.active.contains_key(job_id) {
            SubscriptionState::Active
        } else if inner.subscribing.contains(job_id) {
            SubscriptionState::Subscribing
        } else {
            SubscriptionState::Absent
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("subscriptions lock poisoned").active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The latest head seen through [crate::HeadTrackable::on_new_head].
    pub fn head(&self) -> ChainHead {
        self.head.head()
    }

    pub(crate) fn head_state(&self) -> &HeadState {
        &self.head
    }

    pub(crate) fn resumer(&self) -> &SingleFlightWaker {
        &self.resumer
    }

    pub(crate) fn store(&self) -> &dyn JobStore {
        self.store.as_ref()
    }

    /// Marks `job_id` as subscribing. Returns `None` if it is already
    /// subscribing or active.
    fn reserve(&self, job_id: JobId) -> Result<Option<Reservation<'_>>, JobSubscriberError> {
        let mut inner = self.inner.write().expect("subscriptions lock poisoned");
        if inner.shutting_down {
            return Err(JobSubscriberError::ShuttingDown);
        }
        if inner.active.contains_key(&job_id) || !inner.subscribing.insert(job_id) {
            return Ok(None);
        }
        Ok(Some(Reservation { inner: &self.inner, metrics: &self.metrics, job_id, done: false }))
    }
}

/// A job in the `Subscribing` state.
///
/// Dropping the reservation without committing it, including when the
/// `add_job` future is cancelled mid-subscribe, puts the job back to `Absent`.
struct Reservation<'a> {
    inner: &'a RwLock<Subscriptions>,
    metrics: &'a JobSubscriberMetrics,
    job_id: JobId,
    done: bool,
}

impl Reservation<'_> {
    /// Registers `subscription`, returning the new number of active
    /// subscriptions. Hands the subscription back if shutdown started in the
    /// meantime.
    fn commit(mut self, subscription: JobSubscription) -> Result<usize, JobSubscription> {
        let mut inner = self.inner.write().expect("subscriptions lock poisoned");
        inner.subscribing.remove(&self.job_id);
        self.done = true;

        if inner.shutting_down {
            return Err(subscription);
        }
        inner.active.insert(self.job_id, subscription);
        self.metrics.record_subscriptions(inner.active.len());
        Ok(inner.active.len())
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Ok(mut inner) = self.inner.write() {
            inner.subscribing.remove(&self.job_id);
        }
    }
}
