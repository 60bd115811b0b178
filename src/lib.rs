//! lookupd — a cancellation-aware HTTP lookup service.
//!
//! Accepts HTTP/1.1 connections, resolves each request to one lookup against
//! a shared connection pool, and answers with a plaintext response. Every
//! stage of a session (read → handle → write) runs under its own deadline,
//! composed through the [`cancel::Scope`] tree, so any stage can be aborted
//! independently without disturbing sibling sessions or the listener.
//!
//! ```text
//!  Listener ──accept──▶ Session ──▶ parse id ──▶ LookupHandler ──▶ Pool ──▶ StoreBackend
//!                          │
//!                   per-stage Scopes (read / handle / write)
//! ```

// Core subsystems
pub mod cancel;
pub mod config;
pub mod handler;
pub mod http;
pub mod net;
pub mod store;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use cancel::Scope;
pub use config::ServerConfig;
pub use handler::LookupHandler;
pub use lifecycle::Shutdown;
pub use net::Listener;
pub use store::Pool;
