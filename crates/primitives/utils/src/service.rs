//! Cancellation scopes for long-running node components.

use futures::Future;
use tokio_util::sync::CancellationToken;

/// Cancellation context associated to a long-running task.
///
/// # Scope
///
/// You can create a hierarchy of contexts by calling [ServiceContext::child].
/// Tasks are said to be in the same _local scope_ if they inherit the same
/// `token_local` cancellation token. You can think of tasks being local if
/// they can cancel each other without affecting the rest of the node.
///
/// All tasks which descend from the same context are also said to be in the
/// same _global scope_, that is to say any task in this scope can cancel
/// _all_ other tasks in the same scope (including children) at any time.
///
/// > A parent can always cancel all of its children, but a child cannot
/// > cancel its parent.
#[derive(Default)]
pub struct ServiceContext {
    token_global: CancellationToken,
    token_local: Option<CancellationToken>,
}

impl ServiceContext {
    pub fn new() -> Self {
        Self { token_global: CancellationToken::new(), token_local: None }
    }

    /// Stops all tasks under the same global context scope.
    pub fn cancel_global(&self) {
        self.token_global.cancel();
    }

    /// Stops all tasks under the same local context scope.
    ///
    /// A local context is created by calling [ServiceContext::child] and
    /// allows you to reduce the scope of cancellation only to those tasks
    /// which will use the new context.
    pub fn cancel_local(&self) {
        self.token_local.as_ref().unwrap_or(&self.token_global).cancel();
    }

    /// A future which resolves once this context is cancelled.
    pub async fn cancelled(&self) {
        if let Some(token_local) = &self.token_local {
            tokio::select! {
                _ = self.token_global.cancelled() => {},
                _ = token_local.cancelled() => {}
            }
        } else {
            self.token_global.cancelled().await
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token_global.is_cancelled() || self.token_local.as_ref().map(|t| t.is_cancelled()).unwrap_or(false)
    }

    /// Runs a future until it completes or the context is cancelled, whichever
    /// comes first. Returns `None` on cancellation.
    pub async fn run_until_cancelled<T, F>(&self, f: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        tokio::select! {
            res = f => Some(res),
            _ = self.cancelled() => None,
        }
    }

    /// Copies the context, maintaining its scope.
    pub fn branch(&self) -> Self {
        Self { token_global: self.token_global.clone(), token_local: self.token_local.clone() }
    }

    /// Copies the context into a new local scope.
    ///
    /// Any task which uses this new context will be able to cancel the tasks
    /// in the same local scope as itself, and any further children, without
    /// affecting the rest of the global scope.
    pub fn child(&self) -> Self {
        let token_local = self.token_local.as_ref().unwrap_or(&self.token_global).child_token();
        Self { token_global: self.token_global.clone(), token_local: Some(token_local) }
    }
}
