//! Semantic validation of a parsed configuration.

use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

/// One constraint violation found during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    ZeroMaxConnections,
    ZeroTimeout(&'static str),
    ZeroPoolSize,
    BadPathPrefix(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address {:?} is not a socket address", addr)
            }
            ValidationError::ZeroMaxConnections => {
                write!(f, "listener.max_connections must be at least 1")
            }
            ValidationError::ZeroTimeout(stage) => {
                write!(f, "timeouts.{}_ms must be non-zero", stage)
            }
            ValidationError::ZeroPoolSize => write!(f, "store.pool_size must be at least 1"),
            ValidationError::BadPathPrefix(prefix) => {
                write!(f, "route.path_prefix {:?} must start with '/'", prefix)
            }
        }
    }
}

/// Check every semantic constraint, collecting all violations.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    }

    for (stage, ms) in [
        ("read", config.timeouts.read_ms),
        ("handle", config.timeouts.handle_ms),
        ("write", config.timeouts.write_ms),
    ] {
        if ms == 0 {
            errors.push(ValidationError::ZeroTimeout(stage));
        }
    }

    if config.store.pool_size == 0 {
        errors.push(ValidationError::ZeroPoolSize);
    }
    if !config.route.path_prefix.starts_with('/') {
        errors.push(ValidationError::BadPathPrefix(
            config.route.path_prefix.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_violation() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.handle_ms = 0;
        config.store.pool_size = 0;
        config.route.path_prefix = "employee/".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroTimeout("handle")));
        assert!(errors.contains(&ValidationError::ZeroPoolSize));
    }
}
