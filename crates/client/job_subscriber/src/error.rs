use hp_job::JobId;
use hp_utils::WakerError;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum JobSubscriberError {
    #[error("Unable to start job subscription for job {job_id}: {source:#}")]
    Transport {
        job_id: JobId,
        #[source]
        source: anyhow::Error,
    },

    #[error("Job {0} not found")]
    NotFound(JobId),

    #[error("Job subscriber is shutting down")]
    ShuttingDown,

    #[error("Failed to load jobs from the job store: {0:#}")]
    JobStore(#[source] anyhow::Error),

    #[error(transparent)]
    Reconcile(#[from] ReconcileErrors),

    #[error(transparent)]
    Waker(#[from] WakerError),
}

/// Every per-job failure of a reconciliation pass.
///
/// One broken job must not prevent the others from being watched, so failures
/// are collected instead of aborting on the first one.
#[derive(Debug, Default)]
pub struct ReconcileErrors(Vec<(JobId, JobSubscriberError)>);

impl ReconcileErrors {
    pub fn push(&mut self, job_id: JobId, err: JobSubscriberError) {
        self.0.push((job_id, err));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn failed_jobs(&self) -> impl Iterator<Item = &JobId> {
        self.0.iter().map(|(job_id, _)| job_id)
    }

    pub fn into_result(self) -> Result<(), JobSubscriberError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into())
        }
    }
}

impl fmt::Display for ReconcileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} job(s) could not be subscribed", self.0.len())?;
        for (job_id, err) in &self.0 {
            write!(f, "; job {job_id}: {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ReconcileErrors {}
