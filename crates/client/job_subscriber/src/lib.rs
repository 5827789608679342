//! Herald job subscriber. This crate keeps the event log watches of every
//! log-initiated job and resumes runs paused waiting for block confirmations
//! whenever the chain advances.
//!
//! # Overview
//!
//! Jobs triggered by on-chain event logs need a live log watch for as long as
//! they exist. The [`SubscriptionRegistry`] owns these watches: job creation
//! and deletion call into it directly, and the head tracker calls into it
//! through the [`HeadTrackable`] callbacks.
//!
//! The actual log plumbing lives behind the [`SubscriptionTransport`] trait,
//! and the execution of runs behind the [`RunManager`] trait. This crate only
//! decides _when_ watches are opened or closed, and _when_ runs are resumed.
//!
//! # Subscriptions
//!
//! A job goes through the following states:
//!
//! ```text
//!   ┌────────┐  add_job  ┌─────────────┐  watch opened  ┌────────┐  remove_job  ┌──────────────┐
//!   │ Absent │ ────────► │ Subscribing │ ─────────────► │ Active │ ───────────► │ Unsubscribed │
//!   └────────┘           └─────────────┘                └────────┘   shutdown   └──────────────┘
//!       ▲                       │ transport error
//!       └───────────────────────┘
//! ```
//!
//! - A job is only ever registered with a live watch: the transport is called
//!   before registration, and a failed watch leaves nothing behind apart from an
//!   error recorded against the job in the [`JobStore`].
//! - At most one watch exists per job. Adding a job which is already
//!   subscribing or active is a no-op, which lets [`SubscriptionRegistry::reconcile`]
//!   run again on every reconnection.
//! - Every watch is unsubscribed exactly once, on removal or on shutdown.
//!
//! # Resumption
//!
//! New heads are stored in a [`HeadState`] and a [`ResumptionWorker`] pass is
//! requested from a [`hp_utils::SingleFlightWaker`]. Heads can arrive far more
//! often than passes complete: requests made while a pass is scheduled or
//! running fold into a single follow-up pass, which reads the head when it
//! starts. The run manager is therefore always called with the freshest head,
//! even across reorgs.
//!
//! Resumption failures are logged and counted, and never stop later passes.

mod client;
mod config;
mod error;
mod head;
mod listener;
mod metrics;
mod registry;
mod transport;
mod worker;

#[cfg(test)]
mod test_utils;

pub use client::{JobStore, RunManager};
pub use config::{JobSubscriberConfig, JobSubscriberParams};
pub use error::{JobSubscriberError, ReconcileErrors};
pub use head::HeadState;
pub use listener::HeadTrackable;
pub use metrics::JobSubscriberMetrics;
pub use registry::{SubscriptionRegistry, SubscriptionState, SUBSCRIPTION_START_ERROR};
pub use transport::{JobSubscription, LogSubscription, SubscriptionTransport};
pub use worker::ResumptionWorker;
