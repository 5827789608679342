use crate::{error::JobSubscriberError, registry::SubscriptionRegistry};
use hp_job::{ChainHead, InitiatorKind};

/// Callbacks of the head tracker.
///
/// The head tracker decides what counts as a new longest chain, across reorgs
/// included, and forwards the result here. Callbacks must return quickly:
/// anything slow is handed to a background task.
#[async_trait::async_trait]
pub trait HeadTrackable: Send + Sync {
    /// Called once the chain client is connected, with the current head if
    /// known.
    async fn connect(&self, head: Option<ChainHead>) -> Result<(), JobSubscriberError>;

    fn on_disconnect(&self);

    fn on_new_head(&self, head: ChainHead);
}

#[async_trait::async_trait]
impl HeadTrackable for SubscriptionRegistry {
    /// Watches every stored log-initiated job. Jobs which are already watched
    /// are left untouched.
    async fn connect(&self, head: Option<ChainHead>) -> Result<(), JobSubscriberError> {
        let jobs =
            self.store().jobs_with_initiators(&InitiatorKind::LOG_DRIVEN).map_err(JobSubscriberError::JobStore)?;
        tracing::debug!("Reconciling {} stored job(s)", jobs.len());
        self.reconcile(jobs, head).await
    }

    /// Job subscriptions reconnect on their own.
    fn on_disconnect(&self) {}

    fn on_new_head(&self, head: ChainHead) {
        tracing::trace!(head = %head, "Received new head");
        self.head_state().set_head(head);
        self.resumer().wake_up();
    }
}
