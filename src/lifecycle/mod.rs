//! Process lifecycle: startup ordering, shutdown coordination, OS signals.
//!
//! Startup is: logging → config → fixture/pool → bind → serve. Shutdown is
//! signal-driven: stop accepting, drain live sessions, close the pool.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
