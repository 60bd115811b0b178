//! TCP listener with backpressure.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections
//! - Enforce max_connections via semaphore permits
//! - Launch one detached session per connection; never wait for it
//! - Stop accepting (and only that) on the shutdown signal

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Semaphore};

use crate::config::{ListenerConfig, TimeoutConfig};
use crate::handler::LookupHandler;
use crate::net::session::{Session, SessionTracker};

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Failed to bind to address.
    Bind(std::io::Error),
    /// Failed to accept connection.
    Accept(std::io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Bind(e) => write!(f, "failed to bind: {}", e),
            ListenerError::Accept(e) => write!(f, "failed to accept: {}", e),
        }
    }
}

impl std::error::Error for ListenerError {}

/// A bounded TCP listener that limits concurrent sessions.
///
/// Uses a semaphore to enforce `max_connections`: when the limit is reached,
/// accepting pauses until a session ends and frees its slot.
pub struct Listener {
    inner: TcpListener,
    connection_limit: Arc<Semaphore>,
}

impl Listener {
    /// Bind to the configured address with connection limits.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
            ListenerError::Bind(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;

        let listener = TcpListener::bind(addr).await.map_err(ListenerError::Bind)?;
        let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;

        tracing::info!(
            address = %local_addr,
            max_connections = config.max_connections,
            "listener bound"
        );

        Ok(Self {
            inner: listener,
            connection_limit: Arc::new(Semaphore::new(config.max_connections)),
        })
    }

    /// Accept one connection, respecting the connection limit.
    ///
    /// Returns the stream, the peer address, and a permit that must be held
    /// for the session's lifetime.
    async fn accept(&self) -> Result<(TcpStream, SocketAddr, ConnectionPermit), ListenerError> {
        // Acquire the permit first (backpressure), then accept.
        let permit = Arc::clone(&self.connection_limit)
            .acquire_owned()
            .await
            .expect("connection-limit semaphore closed unexpectedly");

        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;

        tracing::trace!(
            peer_addr = %addr,
            available_permits = self.connection_limit.available_permits(),
            "connection accepted"
        );

        Ok((stream, addr, ConnectionPermit { _permit: permit }))
    }

    /// Accept connections until the shutdown signal, spawning one detached
    /// session task per connection.
    ///
    /// A session that fails — or panics — is isolated in its own task and can
    /// neither stop this loop nor touch a sibling session. Transient accept
    /// errors are logged and the loop continues. After the shutdown signal no
    /// new connections are admitted; sessions already running finish on their
    /// own deadlines and are drained via `tracker`.
    pub async fn serve(
        self,
        handler: Arc<LookupHandler>,
        timeouts: TimeoutConfig,
        tracker: SessionTracker,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("shutdown requested; no longer accepting");
                    break;
                }
                accepted = self.accept() => {
                    let (stream, peer_addr, permit) = match accepted {
                        Ok(accepted) => accepted,
                        Err(err) => {
                            tracing::warn!(error = %err, "accept failed");
                            continue;
                        }
                    };

                    let session = Session::new(stream, Arc::clone(&handler), timeouts);
                    let session_id = session.id();
                    let guard = tracker.track();
                    tokio::spawn(async move {
                        tracing::debug!(session_id = %session_id, peer_addr = %peer_addr, "session started");
                        let outcome = session.run().await;
                        tracing::debug!(session_id = %session_id, outcome = ?outcome, "session ended");
                        drop(guard);
                        drop(permit);
                    });
                }
            }
        }
    }

    /// The local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }
}

/// A permit representing one connection slot.
///
/// Dropped when the session task ends — including by panic — so the slot
/// always returns to the listener.
#[derive(Debug)]
struct ConnectionPermit {
    _permit: tokio::sync::OwnedSemaphorePermit,
}
