//! HTTP/1.1 wire boundary.
//!
//! # Responsibilities
//! - Read one full request head from a byte stream
//! - Expose only what the core interprets: method, target, version
//! - Assemble complete responses in memory before any byte is sent
//!
//! # Design Decisions
//! - `httparse` does the byte-level parsing; the core never scans headers
//! - One request per connection, `Connection: close` always (no keep-alive)
//! - A response is written with a single `write_all`: all or nothing

pub mod request;
pub mod response;

pub use request::{read_request, ProtocolError, Request};
pub use response::Response;
