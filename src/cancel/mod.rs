//! Cancellation scopes.
//!
//! # Responsibilities
//! - Bound how long suspending operations may stay parked
//! - Compose nested deadlines (child inherits the tighter bound)
//! - Propagate manual cancellation downward through the scope tree
//! - Make aborts observable as a failure mode distinct from errors

mod scope;

pub use scope::{CancelReason, Cancelled, Scope};
