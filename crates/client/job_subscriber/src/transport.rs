use hp_job::{ChainHead, JobSpec};
#[cfg(test)]
use mockall::automock;

/// A live event log watch for a single job.
///
/// Unsubscribing consumes the watch, so it can only ever happen once.
pub trait LogSubscription: Send + Sync {
    fn unsubscribe(self: Box<Self>);
}

/// Opens event log watches for jobs.
///
/// Implementations connect to the chain client, filter logs for the job's
/// log-driven initiators and start runs from them.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait SubscriptionTransport: Send + Sync {
    /// Starts watching logs for `job`. Logs older than `head` are ignored when
    /// it is set.
    async fn subscribe(&self, job: &JobSpec, head: Option<ChainHead>) -> anyhow::Result<Box<dyn LogSubscription>>;
}

/// A registered watch together with the job it was opened for.
pub struct JobSubscription {
    job: JobSpec,
    inner: Box<dyn LogSubscription>,
}

impl JobSubscription {
    pub fn new(job: JobSpec, inner: Box<dyn LogSubscription>) -> Self {
        Self { job, inner }
    }

    pub fn job(&self) -> &JobSpec {
        &self.job
    }

    pub fn unsubscribe(self) {
        tracing::debug!(job_id = %self.job.id, "Unsubscribing from event logs");
        self.inner.unsubscribe()
    }
}
