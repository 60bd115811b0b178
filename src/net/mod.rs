//! Network frontend: listener and per-connection sessions.
//!
//! # Responsibilities
//! - Bind and accept, decoupled from session latency
//! - Drive each connection through read → handle → write exactly once
//! - Keep session failures contained: never the listener's problem

pub mod listener;
pub mod session;

pub use listener::{Listener, ListenerError};
pub use session::{Session, SessionId, SessionOutcome, SessionTracker, Stage};
