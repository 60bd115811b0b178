//! In-memory backend: the bundled store implementation and test double.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::store::{Row, StoreBackend, StoreError};

/// A seeded row map standing where a real database driver would plug in.
///
/// Supports injecting a fixed per-query delay (to exercise timeout paths)
/// and counts queries so tests can assert how many lookups actually ran.
pub struct MemoryBackend {
    rows: HashMap<u64, Row>,
    delay: Option<Duration>,
    queries: AtomicU64,
}

impl MemoryBackend {
    pub fn new(rows: impl IntoIterator<Item = Row>) -> Self {
        Self {
            rows: rows.into_iter().map(|row| (row.id, row)).collect(),
            delay: None,
            queries: AtomicU64::new(0),
        }
    }

    /// Delay every lookup by `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Seed from a TOML fixture file (`[[rows]]` entries with `id` and
    /// `last_name`).
    pub fn from_fixture(path: &std::path::Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path).map_err(FixtureError::Io)?;
        let fixture: Fixture = toml::from_str(&content).map_err(FixtureError::Parse)?;
        Ok(Self::new(fixture.rows))
    }

    /// Total lookups issued so far, including cancelled ones.
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }
}

#[derive(serde::Deserialize)]
struct Fixture {
    #[serde(default)]
    rows: Vec<Row>,
}

/// Error loading a fixture file.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("failed to read fixture: {0}")]
    Io(std::io::Error),
    #[error("failed to parse fixture: {0}")]
    Parse(toml::de::Error),
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn lookup(&self, id: u64) -> Result<Option<Row>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.rows.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_seeded_rows_and_counts_queries() {
        let backend = MemoryBackend::new([Row {
            id: 1,
            last_name: "Doe".into(),
        }]);

        assert_eq!(
            backend.lookup(1).await.unwrap().map(|r| r.last_name),
            Some("Doe".to_string())
        );
        assert_eq!(backend.lookup(2).await.unwrap(), None);
        assert_eq!(backend.queries(), 2);
    }
}
