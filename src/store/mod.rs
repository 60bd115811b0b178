//! Backend store boundary.
//!
//! # Responsibilities
//! - Define the gateway contract the pipeline consumes (acquire → query)
//! - Bound concurrent backend use with a fixed-size connection pool
//! - Guarantee release on every exit path: success, error, cancellation
//!
//! # Design Decisions
//! - The query machinery lives behind [`StoreBackend`]; the core never sees
//!   wire protocols or credentials
//! - Release rides on `Drop` of an owned permit, so each acquire pairs with
//!   exactly one release and a cancelled query cannot leak its slot
//! - Backends synchronize their own shared state; the pool only meters entry

pub mod memory;
pub mod pool;

pub use memory::{FixtureError, MemoryBackend};
pub use pool::{Pool, PooledConn};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The zero-or-one record a lookup yields. Held only within the handler's
/// stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Row {
    pub id: u64,
    pub last_name: String,
}

/// Failures at the store boundary. All of these are caught at the request
/// handler and surface to the client as an internal-error response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The scope fired while waiting for a free pooled connection.
    #[error("timed out waiting for a pooled connection")]
    PoolTimeout,
    /// The pool has been shut down; no new connections are handed out.
    #[error("connection pool unavailable")]
    PoolUnavailable,
    /// The scope fired while the query was in flight.
    #[error("query aborted by its scope")]
    QueryTimeout,
    /// The backend reported a protocol or server-side failure.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// A backend capable of executing one parameterized lookup.
///
/// Contract: each call produces exactly one of row, empty result, or error —
/// never a partial row. Implementations must be cancel-safe: the future may
/// be dropped at any suspension point, and the backend must remain usable
/// for later queries.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn lookup(&self, id: u64) -> Result<Option<Row>, StoreError>;
}
