//! Shutdown coordination: stop accepting, then drain live sessions.

use tokio::sync::broadcast;

use crate::net::SessionTracker;

/// Coordinator for graceful shutdown.
///
/// Broadcasts the stop-accepting signal to the listener and owns the session
/// tracker, so the same handle that triggers shutdown can wait for the
/// sessions it let finish. Cloning yields another handle to the same
/// coordinator.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    sessions: SessionTracker,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            sessions: SessionTracker::new(),
        }
    }

    /// Subscribe to the stop-accepting signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the signal. Sessions already running are not interrupted;
    /// they finish on their own stage deadlines and are awaited by
    /// [`Shutdown::drain`].
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// The tracker sessions register with while they run.
    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }

    /// Wait until every live session has ended.
    pub async fn drain(&self) {
        self.sessions.wait_idle().await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn trigger_reaches_subscribers() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        shutdown.trigger();
        tokio::time::timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("signal never arrived")
            .unwrap();
    }

    #[tokio::test]
    async fn drain_waits_for_the_last_session() {
        let shutdown = Shutdown::new();
        let guard = shutdown.sessions().track();
        assert_eq!(shutdown.sessions().active_count(), 1);

        let waiter = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { shutdown.drain().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_millis(500), waiter)
            .await
            .expect("drain never returned")
            .unwrap();
    }
}
