//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once, at process start
//! - Respect `RUST_LOG` when set, defaulting to crate-level debug
//!
//! # Design Decisions
//! - `tracing` for structured fields (session_id, peer_addr, stage)
//! - Client mistakes are logged at debug, faults at warn/error

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lookupd=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
