//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
///
/// A relative `store.fixture_path` is resolved against the config file's
/// own directory, not the process working directory, so a config and its
/// fixture can ship side by side.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: ServerConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    if let Some(fixture) = config.store.fixture_path.take() {
        config.store.fixture_path = Some(match path.parent() {
            Some(dir) if fixture.is_relative() && !dir.as_os_str().is_empty() => {
                dir.join(fixture)
            }
            _ => fixture,
        });
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lookupd-{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_and_resolves_relative_fixture_path() {
        let path = write_temp(
            "loader-ok.toml",
            r#"
            [store]
            fixture_path = "rows.toml"
            "#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(
            config.store.fixture_path,
            Some(std::env::temp_dir().join("rows.toml"))
        );
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn absolute_fixture_path_is_kept() {
        let path = write_temp(
            "loader-abs.toml",
            r#"
            [store]
            fixture_path = "/etc/lookupd/rows.toml"
            "#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(
            config.store.fixture_path,
            Some(PathBuf::from("/etc/lookupd/rows.toml"))
        );
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let path = write_temp("loader-parse.toml", "[store\npool_size = nope");
        assert!(matches!(
            load_config(&path).unwrap_err(),
            ConfigError::Parse(_)
        ));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn constraint_violations_are_validation_errors() {
        let path = write_temp(
            "loader-invalid.toml",
            r#"
            [store]
            pool_size = 0
            "#,
        );
        assert!(matches!(
            load_config(&path).unwrap_err(),
            ConfigError::Validation(errors) if errors == vec![ValidationError::ZeroPoolSize]
        ));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let missing = std::env::temp_dir().join("lookupd-definitely-not-here.toml");
        assert!(matches!(
            load_config(&missing).unwrap_err(),
            ConfigError::Io(_)
        ));
    }
}
