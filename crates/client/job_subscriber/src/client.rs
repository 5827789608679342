use hp_job::{ChainHead, InitiatorKind, JobId, JobSpec};
#[cfg(test)]
use mockall::automock;

/// Executor of job runs.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait RunManager: Send + Sync {
    /// Resumes every run paused waiting for block confirmations whose
    /// required depth is reached at `head`.
    async fn resume_all_pending_at(&self, head: &ChainHead) -> anyhow::Result<()>;
}

/// Persistent storage of job specifications.
#[cfg_attr(test, automock)]
pub trait JobStore: Send + Sync {
    /// Stored jobs having at least one initiator of the given kinds.
    fn jobs_with_initiators(&self, kinds: &[InitiatorKind]) -> anyhow::Result<Vec<JobSpec>>;

    /// Records an operator-visible error against a job.
    fn upsert_error_for(&self, job_id: &JobId, description: &str) -> anyhow::Result<()>;
}
