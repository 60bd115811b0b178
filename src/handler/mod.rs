//! Request handling.
//!
//! # Responsibilities
//! - Extract the identifier from the request line
//! - Drive the acquire → query sequence under the handle scope
//! - Convert every store failure into a well-formed response at this boundary
//!
//! # Design Decisions
//! - Malformed input short-circuits to 400 before any store call is issued
//! - Pool and backend errors never escape past `handle`; they become 500s
//!   and a structured log entry
//! - The only way `handle` produces no response is the *enclosing* scope
//!   firing, which the session observes as `Cancelled` and answers with
//!   silence on the wire

pub mod ident;

pub use ident::parse_identifier;

use std::sync::Arc;
use std::time::Duration;

use crate::cancel::Scope;
use crate::http::{Request, Response};
use crate::store::{Pool, Row, StoreError};

/// Resolves one parsed request to a response via the pooled store.
pub struct LookupHandler {
    pool: Arc<Pool>,
    path_prefix: String,
    acquire_timeout: Duration,
}

impl LookupHandler {
    pub fn new(pool: Arc<Pool>, path_prefix: impl Into<String>, acquire_timeout: Duration) -> Self {
        Self {
            pool,
            path_prefix: path_prefix.into(),
            acquire_timeout,
        }
    }

    /// Produce a response for `request`.
    ///
    /// Always returns a complete [`Response`]; callers bound the whole call
    /// with their own scope when they need a handle deadline.
    pub async fn handle(&self, scope: &Scope, request: &Request) -> Response {
        let version = request.version;

        let Some(id) = parse_identifier(&request.method, &request.target, &self.path_prefix)
        else {
            // A client mistake, not a fault.
            tracing::debug!(
                method = %request.method,
                target = %request.target,
                "request carries no identifier"
            );
            return Response::bad_request().with_version(version);
        };

        match self.lookup(scope, id).await {
            Ok(Some(row)) => Response::ok(row.last_name).with_version(version),
            Ok(None) => Response::not_found().with_version(version),
            Err(err) => {
                tracing::warn!(id, error = %err, "lookup failed");
                Response::internal_error().with_version(version)
            }
        }
    }

    async fn lookup(&self, scope: &Scope, id: u64) -> Result<Option<Row>, StoreError> {
        // Acquisition gets its own, usually tighter, bound under the handle
        // scope; the query runs on the handle scope's remaining budget. The
        // connection drops at the end of this frame on every path.
        let acquire_scope = scope.child_with_timeout(self.acquire_timeout);
        let mut conn = self.pool.acquire(&acquire_scope).await?;
        conn.query(scope, id).await
    }

    pub fn pool(&self) -> &Arc<Pool> {
        &self.pool
    }
}
