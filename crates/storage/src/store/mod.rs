//! Storage seam used by the reconciliation layer.
//!
//! [`RosterStore`] covers reads plus opening a [`UnitOfWork`]. Every write goes
//! through a unit of work, so a field snapshot or a batch of results becomes
//! visible all at once or not at all.

mod in_memory;
mod postgres;

pub use in_memory::{FailurePoint, InMemoryStore};
pub use postgres::{PgStore, PgUnitOfWork};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{
    Golfer, NewResultRecord, NewRosterEntry, ResultRecord, RosterEntry, Tournament,
};

#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn find_tournament(&self, tournament_id: i32) -> Result<Option<Tournament>>;

    async fn next_upcoming_tournament(&self, today: NaiveDate) -> Result<Option<Tournament>>;

    async fn most_recent_completed_tournament(
        &self,
        today: NaiveDate,
    ) -> Result<Option<Tournament>>;

    async fn list_golfers(&self) -> Result<Vec<Golfer>>;

    /// All roster entries for the tournament-year, retired ones included.
    async fn roster_history(&self, tournament_id: i32, year: i32) -> Result<Vec<RosterEntry>>;

    async fn results_for(&self, tournament_id: i32, year: i32) -> Result<Vec<ResultRecord>>;

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;
}

/// An open atomic batch of writes.
///
/// Dropping a unit of work without calling [`UnitOfWork::commit`] discards its
/// writes. Once committed or rolled back, every further call fails with
/// [`crate::StorageError::UnitOfWorkClosed`].
#[async_trait]
pub trait UnitOfWork: Send {
    async fn retire_current_entries(&mut self, tournament_id: i32, year: i32) -> Result<u64>;

    /// `Ok(None)` means the golfer already has a current entry for the tournament-year.
    async fn insert_current_entry(&mut self, entry: &NewRosterEntry)
    -> Result<Option<RosterEntry>>;

    async fn find_current_entry(
        &mut self,
        tournament_id: i32,
        golfer_id: &str,
        year: i32,
    ) -> Result<Option<RosterEntry>>;

    async fn delete_results(&mut self, tournament_id: i32, year: i32) -> Result<u64>;

    async fn insert_result(&mut self, record: &NewResultRecord) -> Result<ResultRecord>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;
}
