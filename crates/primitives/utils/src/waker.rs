//! Debounced single-flight trigger.
//!
//! A [SingleFlightWaker] runs a unit of work in a background task whenever it
//! is woken up, with two guarantees:
//!
//! - at most one execution of the work runs at any time;
//! - every wake-up is followed by at least one execution which _starts_ after
//!   it, so state changes which happened before the wake-up are observed.
//!
//! Any number of wake-ups received while an execution is scheduled or running
//! collapse into a single follow-up execution. This is what keeps bursts of
//! notifications from queuing unbounded work.
//!
//! ```text
//!            wake_up                     wake_up
//!   ┌──────┐ ──────► ┌───────────┐     ┌─────────┐ ──────► ┌────────────────────────┐
//!   │ Idle │         │ Scheduled │────►│ Running │         │ RunningWithPendingWake │
//!   └──────┘ ◄────── └───────────┘     └─────────┘         └────────────────────────┘
//!       ▲     (done)                        │ done                     │ done
//!       └───────────────────────────────────┘          back to Scheduled
//! ```

use crate::service::ServiceContext;
use std::sync::{Arc, Mutex};
use tokio::{sync::Notify, task::JoinHandle};

/// A unit of work driven by a [SingleFlightWaker].
///
/// Failures are the worker's own business: `work` has no return value and
/// implementations are expected to log their errors. The waker keeps accepting
/// wake-ups regardless of the outcome of a run.
#[async_trait::async_trait]
pub trait SingleFlight: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn work(&self);
}

#[derive(Debug, thiserror::Error)]
pub enum WakerError {
    #[error("Single flight worker '{name}' terminated abnormally: {source}")]
    Join { name: &'static str, source: tokio::task::JoinError },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WakerState {
    Idle,
    Scheduled,
    Running,
    RunningWithPendingWake,
    Stopped,
}

impl WakerState {
    /// Returns the next state and whether the run loop needs to be notified.
    fn on_wake(self) -> (Self, bool) {
        match self {
            Self::Idle => (Self::Scheduled, true),
            Self::Running => (Self::RunningWithPendingWake, false),
            state => (state, false),
        }
    }

    fn on_start(self) -> Option<Self> {
        match self {
            Self::Scheduled => Some(Self::Running),
            _ => None,
        }
    }

    fn on_complete(self) -> Self {
        match self {
            Self::Running => Self::Idle,
            Self::RunningWithPendingWake => Self::Scheduled,
            state => state,
        }
    }
}

struct Shared {
    name: &'static str,
    state: Mutex<WakerState>,
    notify: Notify,
}

impl Shared {
    fn transition<T>(&self, f: impl FnOnce(WakerState) -> (WakerState, T)) -> T {
        let mut state = self.state.lock().expect("waker state lock poisoned");
        let (next, out) = f(*state);
        if next != *state {
            tracing::trace!("{}: {:?} -> {:?}", self.name, *state, next);
        }
        *state = next;
        out
    }

    fn begin_run(&self) -> bool {
        self.transition(|state| match state.on_start() {
            Some(next) => (next, true),
            None => (state, false),
        })
    }

    fn complete_run(&self) {
        self.transition(|state| (state.on_complete(), ()))
    }
}

pub struct SingleFlightWaker {
    shared: Arc<Shared>,
    ctx: ServiceContext,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SingleFlightWaker {
    /// Spawns the run loop of `worker` on the current tokio runtime.
    ///
    /// The loop lives in a child scope of `ctx`: cancelling `ctx` stops it
    /// too, but [SingleFlightWaker::stop] does not affect the parent.
    pub fn new<W: SingleFlight>(worker: W, ctx: &ServiceContext) -> Self {
        let shared =
            Arc::new(Shared { name: worker.name(), state: Mutex::new(WakerState::Idle), notify: Notify::new() });
        let ctx = ctx.child();
        let handle = tokio::spawn(run_loop(worker, Arc::clone(&shared), ctx.branch()));
        Self { shared, ctx, handle: Mutex::new(Some(handle)) }
    }

    /// Requests an execution of the work. Never blocks.
    pub fn wake_up(&self) {
        let notify = self.shared.transition(WakerState::on_wake);
        if notify {
            self.shared.notify.notify_one();
        }
    }

    pub fn state(&self) -> WakerState {
        *self.shared.state.lock().expect("waker state lock poisoned")
    }

    /// Stops the run loop, waiting for an in-flight execution to complete.
    ///
    /// A pending wake-up is dropped, and later wake-ups are ignored. Calling
    /// this more than once is fine.
    pub async fn stop(&self) -> Result<(), WakerError> {
        self.shared.transition(|_| (WakerState::Stopped, ()));
        self.ctx.cancel_local();

        let handle = self.handle.lock().expect("waker handle lock poisoned").take();
        if let Some(handle) = handle {
            handle.await.map_err(|source| WakerError::Join { name: self.shared.name, source })?;
            tracing::debug!("{} stopped", self.shared.name);
        }
        Ok(())
    }
}

async fn run_loop<W: SingleFlight>(worker: W, shared: Arc<Shared>, ctx: ServiceContext) {
    loop {
        // Runs are only ever started from Scheduled, so a stale notification
        // permit left over from an earlier wake-up is harmless.
        while shared.begin_run() {
            worker.work().await;
            shared.complete_run();
        }

        if ctx.run_until_cancelled(shared.notify.notified()).await.is_none() {
            break;
        }
    }
}
