use crate::{client::RunManager, head::HeadState, metrics::JobSubscriberMetrics};
use hp_utils::SingleFlight;
use std::sync::Arc;

/// Resumes runs waiting for confirmations, at the latest known head.
///
/// Driven by a [hp_utils::SingleFlightWaker]: the head is read when the pass
/// starts, never when it was requested, so a pass always acts on the freshest
/// head even if several arrived in between.
pub struct ResumptionWorker {
    run_manager: Arc<dyn RunManager>,
    head: Arc<HeadState>,
    metrics: Arc<JobSubscriberMetrics>,
}

impl ResumptionWorker {
    pub fn new(run_manager: Arc<dyn RunManager>, head: Arc<HeadState>, metrics: Arc<JobSubscriberMetrics>) -> Self {
        Self { run_manager, head, metrics }
    }
}

#[async_trait::async_trait]
impl SingleFlight for ResumptionWorker {
    fn name(&self) -> &'static str {
        "job_resumer"
    }

    async fn work(&self) {
        let head = self.head.head();
        self.metrics.resumptions.add(1, &[]);
        if let Err(err) = self.run_manager.resume_all_pending_at(&head).await {
            self.metrics.resumption_failures.add(1, &[]);
            tracing::warn!(head = %head, "Failed to resume confirming tasks on new head: {err:#}");
        }
    }
}
