use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{CanonicalStatus, NewResultRecord, Placement, ResultRecord};

/// The placement column is JSONB so numbers and labels keep their kind.
#[derive(Debug, FromRow)]
struct ResultRow {
    result_id: Uuid,
    roster_entry_id: Uuid,
    result: Option<Json<Placement>>,
    status: String,
    score_to_par: Option<i32>,
    is_team_split: bool,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<ResultRow> for ResultRecord {
    type Error = StorageError;

    fn try_from(row: ResultRow) -> Result<Self> {
        let status = CanonicalStatus::from_db(&row.status).ok_or_else(|| {
            StorageError::ConstraintViolation(format!(
                "result {} has unknown status '{}'",
                row.result_id, row.status
            ))
        })?;

        Ok(ResultRecord {
            result_id: row.result_id,
            roster_entry_id: row.roster_entry_id,
            result: row.result.map(|Json(placement)| placement),
            status,
            score_to_par: row.score_to_par,
            is_team_split: row.is_team_split,
            recorded_at: row.recorded_at,
        })
    }
}

pub struct ResultRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ResultRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&mut self, record: &NewResultRecord) -> Result<ResultRecord> {
        let row = sqlx::query_as::<_, ResultRow>(
            r#"
            INSERT INTO result_records (
                result_id, roster_entry_id, result, status,
                score_to_par, is_team_split, recorded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING result_id, roster_entry_id, result, status,
                      score_to_par, is_team_split, recorded_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(record.roster_entry_id)
        .bind(record.result.clone().map(Json))
        .bind(record.status.as_str())
        .bind(record.score_to_par)
        .bind(record.is_team_split)
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await
        .map_err(StorageError::from)
        .map_err(|e| {
            if e.is_foreign_key_violation() {
                StorageError::ConstraintViolation(format!(
                    "roster entry {} does not exist",
                    record.roster_entry_id
                ))
            } else {
                e
            }
        })?;

        row.try_into()
    }

    /// Removes all results attached to any entry of the tournament-year.
    pub async fn delete_for(&mut self, tournament_id: i32, year: i32) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM result_records r
            USING roster_entries e
            WHERE r.roster_entry_id = e.roster_entry_id
              AND e.tournament_id = $1
              AND e.year = $2
            "#,
        )
        .bind(tournament_id)
        .bind(year)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn list_for(&mut self, tournament_id: i32, year: i32) -> Result<Vec<ResultRecord>> {
        let rows = sqlx::query_as::<_, ResultRow>(
            r#"
            SELECT r.result_id, r.roster_entry_id, r.result, r.status,
                   r.score_to_par, r.is_team_split, r.recorded_at
            FROM result_records r
            JOIN roster_entries e ON e.roster_entry_id = r.roster_entry_id
            WHERE e.tournament_id = $1 AND e.year = $2
            ORDER BY r.recorded_at ASC, r.result_id ASC
            "#,
        )
        .bind(tournament_id)
        .bind(year)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(ResultRecord::try_from).collect()
    }
}
