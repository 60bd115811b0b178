//! Configuration subsystem.
//!
//! # Responsibilities
//! - Define the TOML schema with serde defaults
//! - Load and parse config files
//! - Validate semantic constraints before startup

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ListenerConfig, RouteConfig, ServerConfig, StoreConfig, TimeoutConfig};
pub use validation::{validate_config, ValidationError};
