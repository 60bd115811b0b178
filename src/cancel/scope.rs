//! The cancellation scope tree.
//!
//! A [`Scope`] bounds a set of suspending operations with an optional
//! deadline and a manual trigger. Scopes form a tree: a child observes every
//! ancestor's trigger and inherits the tighter of its own and its parent's
//! deadline. Firing only ever travels downward; cancelling a child has no
//! effect on its parent or siblings.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::select_all;
use tokio::sync::watch;
use tokio::time::{self, Instant};

/// Why a scope fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The effective deadline elapsed.
    DeadlineElapsed,
    /// [`Scope::cancel`] was invoked on this scope or an ancestor.
    Triggered,
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelReason::DeadlineElapsed => write!(f, "deadline elapsed"),
            CancelReason::Triggered => write!(f, "cancellation triggered"),
        }
    }
}

/// The failure an operation observes when its scope fires before it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled: {reason}")]
pub struct Cancelled {
    /// Why the enclosing scope fired.
    pub reason: CancelReason,
}

#[derive(Debug)]
struct Inner {
    /// Effective deadline: already the minimum over the chain to the root.
    /// Immutable once the scope is built.
    deadline: Option<Instant>,
    /// Manual trigger for this scope. Monotonic: only ever flips to `true`.
    trigger: watch::Sender<bool>,
    /// Trigger receivers for this scope and every ancestor, leaf last.
    watched: Vec<watch::Receiver<bool>>,
}

/// A node in the cancellation tree.
///
/// Cloning a `Scope` yields another handle to the same node, not a child;
/// use [`Scope::child`] and friends to nest.
#[derive(Debug, Clone)]
pub struct Scope {
    inner: Arc<Inner>,
}

impl Scope {
    fn build(parent: Option<&Scope>, deadline: Option<Instant>) -> Self {
        let (trigger, rx) = watch::channel(false);
        let mut watched = parent.map(|p| p.inner.watched.clone()).unwrap_or_default();
        watched.push(rx);

        let deadline = match (deadline, parent.and_then(|p| p.inner.deadline)) {
            (Some(own), Some(inherited)) => Some(own.min(inherited)),
            (own, inherited) => own.or(inherited),
        };

        Self {
            inner: Arc::new(Inner {
                deadline,
                trigger,
                watched,
            }),
        }
    }

    /// Root scope with no deadline; fires only via [`Scope::cancel`].
    pub fn new() -> Self {
        Self::build(None, None)
    }

    /// Root scope firing `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(None, Some(Instant::now() + timeout))
    }

    /// Root scope firing at an absolute deadline.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::build(None, Some(deadline))
    }

    /// Child with no deadline of its own (inherits the parent's).
    pub fn child(&self) -> Self {
        Self::build(Some(self), None)
    }

    /// Child firing `timeout` from now, or at the parent's deadline if that
    /// is sooner.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        Self::build(Some(self), Some(Instant::now() + timeout))
    }

    /// Child firing at `deadline`, or at the parent's deadline if sooner.
    pub fn child_with_deadline(&self, deadline: Instant) -> Self {
        Self::build(Some(self), Some(deadline))
    }

    /// Fire this scope now. Idempotent; descendants observe the trigger,
    /// ancestors and siblings do not.
    pub fn cancel(&self) {
        // Receivers may all be gone (no operation suspended); that's fine.
        let _ = self.inner.trigger.send(true);
    }

    /// Whether this scope has fired (manually, here or above, or by
    /// deadline).
    pub fn is_fired(&self) -> bool {
        self.inner.watched.iter().any(|rx| *rx.borrow())
            || self
                .inner
                .deadline
                .is_some_and(|d| Instant::now() >= d)
    }

    /// The effective deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Time left until the effective deadline. `None` means unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Resolves when the scope fires, reporting why.
    ///
    /// The firing transition is one-shot: once this resolves, it resolves
    /// immediately on every later call.
    pub async fn fired(&self) -> CancelReason {
        let mut watched: Vec<_> = self.inner.watched.iter().cloned().collect();

        let triggered = async {
            let waits = watched
                .iter_mut()
                .map(|rx| {
                    Box::pin(async move {
                        loop {
                            if *rx.borrow_and_update() {
                                return;
                            }
                            if rx.changed().await.is_err() {
                                // That scope handle is gone and can no longer
                                // fire; park this branch.
                                std::future::pending::<()>().await;
                            }
                        }
                    })
                })
                .collect::<Vec<_>>();
            // `watched` always contains at least our own receiver.
            select_all(waits).await;
            CancelReason::Triggered
        };

        match self.inner.deadline {
            Some(deadline) => tokio::select! {
                reason = triggered => reason,
                _ = time::sleep_until(deadline) => CancelReason::DeadlineElapsed,
            },
            None => triggered.await,
        }
    }

    /// Race `op` against this scope firing.
    ///
    /// An already-fired scope never polls `op` at all, so no work (and no
    /// side effect, e.g. a backend call) starts under a dead scope. When the
    /// scope fires mid-operation the operation future is dropped; resources
    /// it held are released by their drop guards before `Cancelled`
    /// propagates.
    pub async fn run<F>(&self, op: F) -> Result<F::Output, Cancelled>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            reason = self.fired() => Err(Cancelled { reason }),
            out = op => Ok(out),
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}
