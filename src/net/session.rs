//! Session state machine and lifecycle tracking.
//!
//! # Responsibilities
//! - Drive one accepted connection through Reading → Handling → Writing → Done
//! - Attach an independent deadline scope to every stage
//! - Turn any stage failure into a clean abort (socket closed, nothing half-sent)
//! - Generate unique session IDs for log correlation
//! - Count live sessions so shutdown can drain them

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::cancel::Scope;
use crate::config::TimeoutConfig;
use crate::handler::LookupHandler;
use crate::http::read_request;

/// Global atomic counter for session IDs.
/// Relaxed ordering suffices: only uniqueness matters, not synchronization.
static SESSION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new() -> Self {
        Self(SESSION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// The stage a session was in when it aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reading,
    Handling,
    Writing,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Reading => write!(f, "reading"),
            Stage::Handling => write!(f, "handling"),
            Stage::Writing => write!(f, "writing"),
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Response fully flushed, socket closed.
    Done,
    /// The named stage failed or timed out; the socket was dropped. When the
    /// abort happens before Writing, not a single response byte was sent.
    Aborted { stage: Stage },
}

/// One accepted connection, driven to completion.
///
/// The pipeline is strictly linear: no stage begins before the previous one
/// completes, and no state is revisited. Each stage runs under its own child
/// of a per-session root scope, so deadlines are independent — a slow read
/// does not eat into the handle budget.
pub struct Session<S> {
    id: SessionId,
    stream: S,
    handler: Arc<LookupHandler>,
    timeouts: TimeoutConfig,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, handler: Arc<LookupHandler>, timeouts: TimeoutConfig) -> Self {
        Self {
            id: SessionId::new(),
            stream,
            handler,
            timeouts,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Run the session to its terminal state.
    pub async fn run(mut self) -> SessionOutcome {
        let root = Scope::new();

        // Reading: one full request head, or nothing.
        let read_scope = root.child_with_timeout(self.timeouts.read());
        let mut buf = BytesMut::with_capacity(1024);
        let request = match read_scope
            .run(read_request(&mut self.stream, &mut buf))
            .await
        {
            Ok(Ok(request)) => request,
            Ok(Err(err)) => {
                // The peer sent garbage or went away; no response is owed.
                tracing::debug!(session_id = %self.id, error = %err, "abort while reading");
                return SessionOutcome::Aborted {
                    stage: Stage::Reading,
                };
            }
            Err(cancelled) => {
                tracing::debug!(
                    session_id = %self.id,
                    reason = %cancelled.reason,
                    "read deadline fired"
                );
                return SessionOutcome::Aborted {
                    stage: Stage::Reading,
                };
            }
        };

        // Handling: its deadline is independent of read and write. If it
        // fires, the in-flight handler (and any nested acquire/query) is torn
        // down and the remaining time budget is treated as exhausted — no
        // response is attempted.
        let handle_scope = root.child_with_timeout(self.timeouts.handle());
        let response = match handle_scope
            .run(self.handler.handle(&handle_scope, &request))
            .await
        {
            Ok(response) => response,
            Err(cancelled) => {
                tracing::warn!(
                    session_id = %self.id,
                    target = %request.target,
                    reason = %cancelled.reason,
                    "handle stage cancelled; aborting without a response"
                );
                return SessionOutcome::Aborted {
                    stage: Stage::Handling,
                };
            }
        };

        // Writing: the response goes out in one write or not at all.
        let write_scope = root.child_with_timeout(self.timeouts.write());
        match write_scope.run(response.write_to(&mut self.stream)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::debug!(session_id = %self.id, error = %err, "abort while writing");
                return SessionOutcome::Aborted {
                    stage: Stage::Writing,
                };
            }
            Err(cancelled) => {
                tracing::warn!(
                    session_id = %self.id,
                    reason = %cancelled.reason,
                    "write deadline fired"
                );
                return SessionOutcome::Aborted {
                    stage: Stage::Writing,
                };
            }
        }

        let _ = self.stream.shutdown().await;
        tracing::debug!(
            session_id = %self.id,
            status = response.status.as_u16(),
            "session complete"
        );
        SessionOutcome::Done
    }
}

/// Tracks live sessions for graceful shutdown.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    active_count: Arc<AtomicU64>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self {
            active_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record a new live session. Returns a guard that decrements on drop.
    pub fn track(&self) -> SessionGuard {
        self.active_count.fetch_add(1, Ordering::SeqCst);
        SessionGuard {
            active_count: Arc::clone(&self.active_count),
        }
    }

    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }

    /// Wait until every tracked session has ended. Sessions bound their own
    /// stages, so this terminates once their deadlines do.
    pub async fn wait_idle(&self) {
        while self.active_count.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for one session's lifetime; decrements the live count when dropped.
#[derive(Debug)]
pub struct SessionGuard {
    active_count: Arc<AtomicU64>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
    }
}
