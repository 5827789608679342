use hp_job::ChainHead;
use std::sync::RwLock;

/// The latest chain head seen by the subscriber.
///
/// Last write wins and no history is kept: resuming paused runs only depends
/// on the freshest head, so intermediate heads may be skipped.
#[derive(Debug, Default)]
pub struct HeadState(RwLock<ChainHead>);

impl HeadState {
    pub fn new(head: ChainHead) -> Self {
        Self(RwLock::new(head))
    }

    pub fn set_head(&self, head: ChainHead) {
        *self.0.write().expect("head lock poisoned") = head;
    }

    pub fn head(&self) -> ChainHead {
        *self.0.read().expect("head lock poisoned")
    }
}
