//! Bounded connection pool in front of a shared backend.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::cancel::Scope;
use crate::store::{Row, StoreBackend, StoreError};

/// A fixed-capacity pool shared by all sessions.
///
/// Capacity is metered with a semaphore; a [`PooledConn`] owns one permit
/// and returns it when dropped. The pool itself holds no per-connection
/// state — the backend behind it is shared and internally synchronized.
pub struct Pool {
    permits: Arc<Semaphore>,
    backend: Arc<dyn StoreBackend>,
    capacity: usize,
}

impl Pool {
    pub fn new(backend: Arc<dyn StoreBackend>, capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            backend,
            capacity,
        }
    }

    /// Wait for a free slot, bounded by `scope`.
    ///
    /// Fails with [`StoreError::PoolTimeout`] when the scope fires first and
    /// [`StoreError::PoolUnavailable`] once the pool is shut down.
    pub async fn acquire(&self, scope: &Scope) -> Result<PooledConn, StoreError> {
        match scope.run(Arc::clone(&self.permits).acquire_owned()).await {
            Err(_) => Err(StoreError::PoolTimeout),
            Ok(Err(_)) => Err(StoreError::PoolUnavailable),
            Ok(Ok(permit)) => Ok(PooledConn {
                _permit: permit,
                backend: Arc::clone(&self.backend),
            }),
        }
    }

    /// Stop handing out connections. In-flight holders keep their permits
    /// and finish naturally.
    pub fn shutdown(&self) {
        self.permits.close();
    }

    /// Free slots right now.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// One pooled connection, alive for the duration of a single query.
///
/// Dropping it — on success, on error, or because an enclosing scope fired
/// and the holding future was torn down — releases the slot exactly once.
pub struct PooledConn {
    _permit: OwnedSemaphorePermit,
    backend: Arc<dyn StoreBackend>,
}

impl std::fmt::Debug for PooledConn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConn").finish_non_exhaustive()
    }
}

impl PooledConn {
    /// Execute one lookup, bounded by `scope`.
    pub async fn query(&mut self, scope: &Scope, id: u64) -> Result<Option<Row>, StoreError> {
        match scope.run(self.backend.lookup(id)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::QueryTimeout),
        }
    }
}
