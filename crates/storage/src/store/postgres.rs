use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::debug;

use super::{RosterStore, UnitOfWork};
use crate::error::{Result, StorageError};
use crate::models::{
    Golfer, NewResultRecord, NewRosterEntry, ResultRecord, RosterEntry, Tournament,
};
use crate::repository::{
    GolferRepository, ResultRepository, RosterRepository, TournamentRepository,
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RosterStore for PgStore {
    async fn find_tournament(&self, tournament_id: i32) -> Result<Option<Tournament>> {
        TournamentRepository::new(&self.pool)
            .find_by_id(tournament_id)
            .await
    }

    async fn next_upcoming_tournament(&self, today: NaiveDate) -> Result<Option<Tournament>> {
        TournamentRepository::new(&self.pool)
            .next_upcoming(today)
            .await
    }

    async fn most_recent_completed_tournament(
        &self,
        today: NaiveDate,
    ) -> Result<Option<Tournament>> {
        TournamentRepository::new(&self.pool)
            .most_recent_completed(today)
            .await
    }

    async fn list_golfers(&self) -> Result<Vec<Golfer>> {
        GolferRepository::new(&self.pool).list().await
    }

    async fn roster_history(&self, tournament_id: i32, year: i32) -> Result<Vec<RosterEntry>> {
        let mut conn = self.pool.acquire().await?;
        RosterRepository::new(&mut *conn)
            .history(tournament_id, year)
            .await
    }

    async fn results_for(&self, tournament_id: i32, year: i32) -> Result<Vec<ResultRecord>> {
        let mut conn = self.pool.acquire().await?;
        ResultRepository::new(&mut *conn)
            .list_for(tournament_id, year)
            .await
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        debug!("Opened Postgres unit of work");
        Ok(Box::new(PgUnitOfWork { tx: Some(tx) }))
    }
}

/// Unit of work backed by a single Postgres transaction.
pub struct PgUnitOfWork {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgUnitOfWork {
    fn conn(&mut self) -> Result<&mut PgConnection> {
        match self.tx.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(StorageError::UnitOfWorkClosed),
        }
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn retire_current_entries(&mut self, tournament_id: i32, year: i32) -> Result<u64> {
        RosterRepository::new(self.conn()?)
            .retire_current(tournament_id, year)
            .await
    }

    async fn insert_current_entry(
        &mut self,
        entry: &NewRosterEntry,
    ) -> Result<Option<RosterEntry>> {
        RosterRepository::new(self.conn()?)
            .insert_current(entry)
            .await
    }

    async fn find_current_entry(
        &mut self,
        tournament_id: i32,
        golfer_id: &str,
        year: i32,
    ) -> Result<Option<RosterEntry>> {
        RosterRepository::new(self.conn()?)
            .find_current(tournament_id, golfer_id, year)
            .await
    }

    async fn delete_results(&mut self, tournament_id: i32, year: i32) -> Result<u64> {
        ResultRepository::new(self.conn()?)
            .delete_for(tournament_id, year)
            .await
    }

    async fn insert_result(&mut self, record: &NewResultRecord) -> Result<ResultRecord> {
        ResultRepository::new(self.conn()?).insert(record).await
    }

    async fn commit(&mut self) -> Result<()> {
        let tx = self.tx.take().ok_or(StorageError::UnitOfWorkClosed)?;
        tx.commit().await?;
        debug!("Committed Postgres unit of work");
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        let tx = self.tx.take().ok_or(StorageError::UnitOfWorkClosed)?;
        tx.rollback().await?;
        debug!("Rolled back Postgres unit of work");
        Ok(())
    }
}
