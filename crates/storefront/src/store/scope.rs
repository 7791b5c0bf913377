//! Result delivery tied to a view's lifetime.
//!
//! A view opens a [`ViewScope`] and hands [`ScopeToken`]s to the work it
//! starts. When the view goes away the scope is cancelled; results that
//! resolve afterwards are discarded. The underlying requests still run to
//! completion and still update the shared store.

use std::future::Future;

use tokio::sync::watch;
use tracing::debug;

/// Cancellation source owned by a view.
#[derive(Debug)]
pub struct ViewScope {
    cancel: watch::Sender<bool>,
}

/// Cheap handle checked before applying a result to view state.
#[derive(Debug, Clone)]
pub struct ScopeToken {
    cancel: watch::Receiver<bool>,
}

impl ViewScope {
    /// Open a new scope.
    #[must_use]
    pub fn new() -> Self {
        let (cancel, _) = watch::channel(false);
        Self { cancel }
    }

    /// A token observing this scope.
    #[must_use]
    pub fn token(&self) -> ScopeToken {
        ScopeToken {
            cancel: self.cancel.subscribe(),
        }
    }

    /// Cancel the scope. Dropping the scope does the same.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl ScopeToken {
    /// Whether the owning view is gone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow() || self.cancel.has_changed().is_err()
    }

    /// Await `work`, returning its output only if the scope is still open.
    pub async fn deliver<F: Future>(&self, work: F) -> Option<F::Output> {
        let output = work.await;
        if self.is_cancelled() {
            debug!("Discarding result for a closed view");
            return None;
        }
        Some(output)
    }

    /// Resolve once the scope is cancelled.
    pub async fn cancelled(&mut self) {
        // An error means the scope was dropped, which is also cancellation.
        let _ = self.cancel.wait_for(|cancelled| *cancelled).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_open_scope_delivers() {
        let scope = ViewScope::new();
        let token = scope.token();
        assert_eq!(token.deliver(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn test_result_after_drop_is_discarded() {
        let scope = ViewScope::new();
        let token = scope.token();

        let pending = tokio::spawn(async move {
            token
                .deliver(async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    "cart"
                })
                .await
        });

        drop(scope);
        assert_eq!(pending.await.ok().flatten(), None);
    }

    #[tokio::test]
    async fn test_cancelled_resolves_on_cancel() {
        let scope = ViewScope::new();
        let mut token = scope.token();
        scope.cancel();
        token.cancelled().await;
        assert!(token.is_cancelled());
    }
}
