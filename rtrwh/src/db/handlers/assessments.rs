//! Database repository for assessments.
//!
//! The table is append-only, so the repository exposes inserts and aggregates only.

use sqlx::SqliteConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        models::assessments::{AssessmentCreateDBRequest, AssessmentTotals},
    },
    types::AssessmentId,
};

pub struct Assessments<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Assessments<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Insert one assessment and return its row id
    #[instrument(skip(self, request), fields(structure_type = %request.structure_type), err)]
    pub async fn create(&mut self, request: &AssessmentCreateDBRequest) -> Result<AssessmentId> {
        let result = sqlx::query(
            r#"
            INSERT INTO assessments
                (roof_area, dwellers, open_space, roof_type, lat, lng, annual_rainfall, captured_volume, structure_type, cost)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.roof_area)
        .bind(request.dwellers)
        .bind(request.open_space)
        .bind(request.roof_type.as_deref())
        .bind(request.lat)
        .bind(request.lng)
        .bind(request.annual_rainfall)
        .bind(request.captured_volume)
        .bind(request.structure_type.as_str())
        .bind(request.cost)
        .execute(&mut *self.db)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Count and total captured volume; zero/zero on an empty table
    #[instrument(skip(self), err)]
    pub async fn totals(&mut self) -> Result<AssessmentTotals> {
        let totals = sqlx::query_as::<_, AssessmentTotals>(
            r#"
            SELECT
                COUNT(*) AS total_assessments,
                COALESCE(SUM(captured_volume), 0.0) AS total_litres
            FROM assessments
            "#,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::StructureType;
    use sqlx::SqlitePool;

    fn request(roof_area: f64, captured_volume: f64) -> AssessmentCreateDBRequest {
        AssessmentCreateDBRequest {
            roof_area,
            dwellers: Some(4),
            open_space: None,
            roof_type: Some("RCC".to_string()),
            lat: 28.6139,
            lng: 77.2090,
            annual_rainfall: 30.0,
            captured_volume,
            structure_type: StructureType::MediumPit,
            cost: 25000.0,
        }
    }

    #[sqlx::test]
    async fn test_totals_on_empty_table(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let totals = Assessments::new(&mut conn).totals().await.unwrap();

        assert_eq!(
            totals,
            AssessmentTotals {
                total_assessments: 0,
                total_litres: 0.0
            }
        );
    }

    #[sqlx::test]
    async fn test_create_assigns_increasing_ids(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Assessments::new(&mut conn);

        let first = repo.create(&request(100.0, 2550.0)).await.unwrap();
        let second = repo.create(&request(120.0, 3060.0)).await.unwrap();
        assert!(second > first);

        let totals = repo.totals().await.unwrap();
        assert_eq!(totals.total_assessments, 2);
        assert!((totals.total_litres - 5610.0).abs() < 1e-9);
    }

    #[sqlx::test]
    async fn test_create_persists_all_columns(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let id = Assessments::new(&mut conn).create(&request(100.0, 2550.0)).await.unwrap();

        let row: (f64, Option<i64>, Option<f64>, Option<String>, f64, f64, String, f64, i64) = sqlx::query_as(
            "SELECT roof_area, dwellers, open_space, roof_type, lat, lng, structure_type, cost, created_at IS NOT NULL
             FROM assessments WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .unwrap();

        assert_eq!(row.0, 100.0);
        assert_eq!(row.1, Some(4));
        assert_eq!(row.2, None);
        assert_eq!(row.3.as_deref(), Some("RCC"));
        assert_eq!((row.4, row.5), (28.6139, 77.2090));
        assert_eq!(row.6, "Medium Pit");
        assert_eq!(row.7, 25000.0);
        assert_eq!(row.8, 1, "created_at should be assigned by the database");
    }
}
