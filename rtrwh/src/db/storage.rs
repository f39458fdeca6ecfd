//! Storage accessor owning the SQLite pool behind the `assessments` table.

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tracing::{info, instrument};

use crate::{
    config::DatabaseConfig,
    db::{
        errors::Result,
        handlers::Assessments,
        models::assessments::{AssessmentCreateDBRequest, AssessmentTotals},
    },
    types::AssessmentId,
};

/// Cheap to clone; every clone shares the same pool.
#[derive(Clone, Debug)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Open (and create if absent) the database file named in `config`.
    ///
    /// WAL lets readers proceed during a write, and the busy timeout makes concurrent writers
    /// queue on SQLite's lock instead of failing straight away.
    #[instrument(skip_all, fields(path = %config.path.display()), err)]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        info!("Opened assessment database at {}", config.path.display());
        Ok(Self { pool })
    }

    /// Wrap an existing pool (tests hand in the per-test database here)
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Ensure the schema exists. Safe to call on every startup.
    #[instrument(skip_all, err)]
    pub async fn initialize(&self) -> Result<()> {
        crate::migrator().run(&self.pool).await?;
        Ok(())
    }

    /// Append one fully computed assessment inside its own transaction.
    pub async fn insert(&self, request: &AssessmentCreateDBRequest) -> Result<AssessmentId> {
        let mut tx = self.pool.begin().await?;
        let id = Assessments::new(&mut tx).create(request).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// Count of stored assessments and the sum of their captured volume.
    pub async fn aggregate(&self) -> Result<AssessmentTotals> {
        let mut conn = self.pool.acquire().await?;
        Assessments::new(&mut conn).totals().await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::StructureType;
    use std::time::Duration;

    fn request(captured_volume: f64) -> AssessmentCreateDBRequest {
        AssessmentCreateDBRequest {
            roof_area: 40.0,
            dwellers: None,
            open_space: Some(12.5),
            roof_type: None,
            lat: 12.9716,
            lng: 77.5946,
            annual_rainfall: 900.0,
            captured_volume,
            structure_type: StructureType::SmallPit,
            cost: 15000.0,
        }
    }

    fn file_config(dir: &tempfile::TempDir) -> DatabaseConfig {
        DatabaseConfig {
            path: dir.path().join("rtrwh.db"),
            max_connections: 4,
            busy_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_connect_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(&dir);
        assert!(!config.path.exists());

        let storage = Storage::connect(&config).await.unwrap();
        storage.initialize().await.unwrap();

        assert!(config.path.exists());
        let totals = storage.aggregate().await.unwrap();
        assert_eq!(totals.total_assessments, 0);
        assert_eq!(totals.total_litres, 0.0);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent_and_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(&dir);

        let storage = Storage::connect(&config).await.unwrap();
        storage.initialize().await.unwrap();
        storage.initialize().await.unwrap();
        storage.insert(&request(30600.0)).await.unwrap();
        storage.close().await;

        let reopened = Storage::connect(&config).await.unwrap();
        reopened.initialize().await.unwrap();
        let totals = reopened.aggregate().await.unwrap();
        assert_eq!(totals.total_assessments, 1);
        assert!((totals.total_litres - 30600.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_connect_fails_for_unwritable_location() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("missing-dir").join("rtrwh.db"),
            ..file_config(&dir)
        };

        assert!(Storage::connect(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_are_all_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::connect(&file_config(&dir)).await.unwrap();
        storage.initialize().await.unwrap();

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let storage = storage.clone();
                tokio::spawn(async move { storage.insert(&request(i as f64)).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let totals = storage.aggregate().await.unwrap();
        assert_eq!(totals.total_assessments, 32);
        // 0 + 1 + ... + 31
        assert!((totals.total_litres - 496.0).abs() < 1e-9);
    }
}
