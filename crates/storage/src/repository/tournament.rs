use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::Result;
use crate::models::Tournament;

pub struct TournamentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TournamentRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, tournament_id: i32) -> Result<Option<Tournament>> {
        let tournament = sqlx::query_as::<_, Tournament>(
            r#"
            SELECT tournament_id, feed_id, name, start_date, end_date, format
            FROM tournaments
            WHERE tournament_id = $1
            "#,
        )
        .bind(tournament_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(tournament)
    }

    /// Earliest tournament starting strictly after `today`.
    pub async fn next_upcoming(&self, today: NaiveDate) -> Result<Option<Tournament>> {
        let tournament = sqlx::query_as::<_, Tournament>(
            r#"
            SELECT tournament_id, feed_id, name, start_date, end_date, format
            FROM tournaments
            WHERE start_date > $1
            ORDER BY start_date ASC, tournament_id ASC
            LIMIT 1
            "#,
        )
        .bind(today)
        .fetch_optional(self.pool)
        .await?;

        Ok(tournament)
    }

    /// Latest tournament that ended strictly before `today`.
    pub async fn most_recent_completed(&self, today: NaiveDate) -> Result<Option<Tournament>> {
        let tournament = sqlx::query_as::<_, Tournament>(
            r#"
            SELECT tournament_id, feed_id, name, start_date, end_date, format
            FROM tournaments
            WHERE end_date < $1
            ORDER BY end_date DESC, tournament_id DESC
            LIMIT 1
            "#,
        )
        .bind(today)
        .fetch_optional(self.pool)
        .await?;

        Ok(tournament)
    }
}
