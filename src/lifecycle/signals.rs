//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT / SIGTERM (async-safe, via Tokio's signal support)
//! - Translate the first signal into the internal shutdown trigger
//!
//! # Design Decisions
//! - Signals stop the accept loop only; in-flight sessions drain on their
//!   own stage deadlines

/// Resolve when the process receives an interrupt or termination signal.
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate =
        signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = terminate.recv() => {},
    }
}

#[cfg(not(unix))]
pub async fn wait_for_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}
