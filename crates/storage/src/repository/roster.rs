use chrono::Utc;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewRosterEntry, RosterEntry};

/// Roster queries bound to a single connection so they can share a transaction.
pub struct RosterRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> RosterRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Marks every current entry of the tournament-year as historical.
    pub async fn retire_current(&mut self, tournament_id: i32, year: i32) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE roster_entries
            SET is_current = FALSE, updated_at = $3
            WHERE tournament_id = $1 AND year = $2 AND is_current
            "#,
        )
        .bind(tournament_id)
        .bind(year)
        .bind(Utc::now())
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Inserts a current entry. Returns `None` when the golfer already has one.
    pub async fn insert_current(&mut self, entry: &NewRosterEntry) -> Result<Option<RosterEntry>> {
        let inserted = sqlx::query_as::<_, RosterEntry>(
            r#"
            INSERT INTO roster_entries (
                roster_entry_id, tournament_id, golfer_id, year,
                is_current, is_active, is_alternate, is_injured, updated_at
            )
            VALUES ($1, $2, $3, $4, TRUE, $5, $6, $7, $8)
            ON CONFLICT (tournament_id, golfer_id, year) WHERE is_current DO NOTHING
            RETURNING roster_entry_id, tournament_id, golfer_id, year,
                      is_current, is_active, is_alternate, is_injured, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.tournament_id)
        .bind(&entry.golfer_id)
        .bind(entry.year)
        .bind(entry.is_active)
        .bind(entry.is_alternate)
        .bind(entry.is_injured)
        .bind(Utc::now())
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(inserted)
    }

    pub async fn find_current(
        &mut self,
        tournament_id: i32,
        golfer_id: &str,
        year: i32,
    ) -> Result<Option<RosterEntry>> {
        let entry = sqlx::query_as::<_, RosterEntry>(
            r#"
            SELECT roster_entry_id, tournament_id, golfer_id, year,
                   is_current, is_active, is_alternate, is_injured, updated_at
            FROM roster_entries
            WHERE tournament_id = $1 AND golfer_id = $2 AND year = $3 AND is_current
            "#,
        )
        .bind(tournament_id)
        .bind(golfer_id)
        .bind(year)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(entry)
    }

    /// Every entry, current and retired, oldest first.
    pub async fn history(&mut self, tournament_id: i32, year: i32) -> Result<Vec<RosterEntry>> {
        let entries = sqlx::query_as::<_, RosterEntry>(
            r#"
            SELECT roster_entry_id, tournament_id, golfer_id, year,
                   is_current, is_active, is_alternate, is_injured, updated_at
            FROM roster_entries
            WHERE tournament_id = $1 AND year = $2
            ORDER BY updated_at ASC, golfer_id ASC
            "#,
        )
        .bind(tournament_id)
        .bind(year)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(entries)
    }
}
