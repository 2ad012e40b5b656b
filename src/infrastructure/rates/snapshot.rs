//! # Rate Snapshots
//!
//! Persists the last good [`RateTable`] as JSON so a restart, or a failed
//! refresh, still has rates to work with.

use crate::domain::services::currency_converter::RateTable;
use crate::infrastructure::rates::error::RatesResult;
use std::path::{Path, PathBuf};

/// JSON file holding one rate table.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Creates a store at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot, `None` if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub async fn load(&self) -> RatesResult<Option<RateTable>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the snapshot, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, table: &RateTable) -> RatesResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string_pretty(table)?;
        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{CurrencyCode, Timestamp};
    use crate::infrastructure::rates::error::RatesError;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("rates.json"));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("data").join("usd_rates.json"));
        let table = RateTable::new(Default::default(), Timestamp::from_secs(1_700_000_000).unwrap())
            .with_rate(CurrencyCode::new("EUR"), Decimal::new(93, 2));

        store.save(&table).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(table));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.json");
        std::fs::write(&path, "not json").unwrap();

        let result = SnapshotStore::new(path).load().await;
        assert!(matches!(result, Err(RatesError::Decode { .. })));
    }
}
