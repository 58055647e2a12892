use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{RosterStore, UnitOfWork};
use crate::error::{Result, StorageError};
use crate::models::{
    Golfer, NewResultRecord, NewRosterEntry, ResultRecord, RosterEntry, Tournament,
};

/// Operation at which an injected failure fires inside the next unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    RetireEntries,
    InsertRosterEntry,
    InsertResult,
    Commit,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    tournaments: BTreeMap<i32, Tournament>,
    golfers: BTreeMap<String, Golfer>,
    roster: Vec<RosterEntry>,
    results: Vec<ResultRecord>,
}

impl MemoryState {
    fn current_entry(&self, tournament_id: i32, golfer_id: &str, year: i32) -> Option<&RosterEntry> {
        self.roster.iter().find(|e| {
            e.is_current && e.tournament_id == tournament_id && e.golfer_id == golfer_id && e.year == year
        })
    }

    fn entry_ids_for(&self, tournament_id: i32, year: i32) -> Vec<Uuid> {
        self.roster
            .iter()
            .filter(|e| e.tournament_id == tournament_id && e.year == year)
            .map(|e| e.roster_entry_id)
            .collect()
    }
}

/// In-memory store for tests and dry runs.
///
/// Units of work stage a full copy of the state and swap it in on commit. Units are
/// not isolated from each other: the last one to commit wins.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
    failure: Arc<Mutex<Option<FailurePoint>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tournament(self, tournament: Tournament) -> Self {
        lock(&self.state)
            .tournaments
            .insert(tournament.tournament_id, tournament);
        self
    }

    pub fn with_golfer(self, golfer: Golfer) -> Self {
        lock(&self.state)
            .golfers
            .insert(golfer.golfer_id.clone(), golfer);
        self
    }

    /// Writes a current entry directly, bypassing units of work.
    pub fn seed_roster_entry(&self, entry: NewRosterEntry) -> RosterEntry {
        let entry = entry.into_entry(Uuid::new_v4(), Utc::now());
        lock(&self.state).roster.push(entry.clone());
        entry
    }

    /// Arms a failure for the next unit of work opened on this store.
    pub fn fail_next_unit_at(&self, point: FailurePoint) {
        *lock(&self.failure) = Some(point);
    }
}

#[async_trait]
impl RosterStore for InMemoryStore {
    async fn find_tournament(&self, tournament_id: i32) -> Result<Option<Tournament>> {
        Ok(lock(&self.state).tournaments.get(&tournament_id).cloned())
    }

    async fn next_upcoming_tournament(&self, today: NaiveDate) -> Result<Option<Tournament>> {
        Ok(lock(&self.state)
            .tournaments
            .values()
            .filter(|t| t.start_date > today)
            .min_by_key(|t| (t.start_date, t.tournament_id))
            .cloned())
    }

    async fn most_recent_completed_tournament(
        &self,
        today: NaiveDate,
    ) -> Result<Option<Tournament>> {
        Ok(lock(&self.state)
            .tournaments
            .values()
            .filter(|t| t.end_date < today)
            .max_by_key(|t| (t.end_date, t.tournament_id))
            .cloned())
    }

    async fn list_golfers(&self) -> Result<Vec<Golfer>> {
        let mut golfers: Vec<Golfer> = lock(&self.state).golfers.values().cloned().collect();
        golfers.sort_by(|a, b| {
            (&a.last_name, &a.first_name, &a.golfer_id).cmp(&(&b.last_name, &b.first_name, &b.golfer_id))
        });
        Ok(golfers)
    }

    async fn roster_history(&self, tournament_id: i32, year: i32) -> Result<Vec<RosterEntry>> {
        Ok(lock(&self.state)
            .roster
            .iter()
            .filter(|e| e.tournament_id == tournament_id && e.year == year)
            .cloned()
            .collect())
    }

    async fn results_for(&self, tournament_id: i32, year: i32) -> Result<Vec<ResultRecord>> {
        let state = lock(&self.state);
        let entry_ids = state.entry_ids_for(tournament_id, year);
        Ok(state
            .results
            .iter()
            .filter(|r| entry_ids.contains(&r.roster_entry_id))
            .cloned()
            .collect())
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let staged = lock(&self.state).clone();
        let failure = lock(&self.failure).take();
        Ok(Box::new(InMemoryUnitOfWork {
            shared: Arc::clone(&self.state),
            staged: Some(staged),
            failure,
        }))
    }
}

struct InMemoryUnitOfWork {
    shared: Arc<Mutex<MemoryState>>,
    staged: Option<MemoryState>,
    failure: Option<FailurePoint>,
}

impl InMemoryUnitOfWork {
    fn staged(&mut self) -> Result<&mut MemoryState> {
        self.staged.as_mut().ok_or(StorageError::UnitOfWorkClosed)
    }

    fn check_failure(&mut self, point: FailurePoint) -> Result<()> {
        if self.staged.is_none() {
            return Err(StorageError::UnitOfWorkClosed);
        }
        if self.failure == Some(point) {
            self.failure = None;
            return Err(StorageError::Injected(format!("{point:?}")));
        }
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn retire_current_entries(&mut self, tournament_id: i32, year: i32) -> Result<u64> {
        self.check_failure(FailurePoint::RetireEntries)?;
        let now = Utc::now();
        let mut retired = 0;
        for entry in self.staged()?.roster.iter_mut().filter(|e| {
            e.is_current && e.tournament_id == tournament_id && e.year == year
        }) {
            entry.is_current = false;
            entry.updated_at = now;
            retired += 1;
        }
        Ok(retired)
    }

    async fn insert_current_entry(
        &mut self,
        entry: &NewRosterEntry,
    ) -> Result<Option<RosterEntry>> {
        self.check_failure(FailurePoint::InsertRosterEntry)?;
        let state = self.staged()?;
        if !state.tournaments.contains_key(&entry.tournament_id) {
            return Err(StorageError::ConstraintViolation(format!(
                "tournament {} does not exist",
                entry.tournament_id
            )));
        }
        if !state.golfers.contains_key(&entry.golfer_id) {
            return Err(StorageError::ConstraintViolation(format!(
                "golfer {} does not exist",
                entry.golfer_id
            )));
        }
        if state
            .current_entry(entry.tournament_id, &entry.golfer_id, entry.year)
            .is_some()
        {
            return Ok(None);
        }

        let inserted = entry.clone().into_entry(Uuid::new_v4(), Utc::now());
        state.roster.push(inserted.clone());
        Ok(Some(inserted))
    }

    async fn find_current_entry(
        &mut self,
        tournament_id: i32,
        golfer_id: &str,
        year: i32,
    ) -> Result<Option<RosterEntry>> {
        Ok(self
            .staged()?
            .current_entry(tournament_id, golfer_id, year)
            .cloned())
    }

    async fn delete_results(&mut self, tournament_id: i32, year: i32) -> Result<u64> {
        let state = self.staged()?;
        let entry_ids = state.entry_ids_for(tournament_id, year);
        let before = state.results.len();
        state
            .results
            .retain(|r| !entry_ids.contains(&r.roster_entry_id));
        Ok((before - state.results.len()) as u64)
    }

    async fn insert_result(&mut self, record: &NewResultRecord) -> Result<ResultRecord> {
        self.check_failure(FailurePoint::InsertResult)?;
        let state = self.staged()?;
        if !state
            .roster
            .iter()
            .any(|e| e.roster_entry_id == record.roster_entry_id)
        {
            return Err(StorageError::ConstraintViolation(format!(
                "roster entry {} does not exist",
                record.roster_entry_id
            )));
        }

        let inserted = record.clone().into_record(Uuid::new_v4(), Utc::now());
        state.results.push(inserted.clone());
        Ok(inserted)
    }

    async fn commit(&mut self) -> Result<()> {
        self.check_failure(FailurePoint::Commit)?;
        let staged = self.staged.take().ok_or(StorageError::UnitOfWorkClosed)?;
        *lock(&self.shared) = staged;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.staged
            .take()
            .map(|_| ())
            .ok_or(StorageError::UnitOfWorkClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tournament(id: i32, start: (i32, u32, u32), end: (i32, u32, u32)) -> Tournament {
        Tournament {
            tournament_id: id,
            feed_id: Some(id as i64 * 10),
            name: format!("Tournament {id}"),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            format: Some("stroke".to_string()),
        }
    }

    fn golfer(id: &str, first: &str, last: &str) -> Golfer {
        Golfer {
            golfer_id: id.to_string(),
            feed_id: None,
            first_name: first.to_string(),
            last_name: last.to_string(),
            full_name: format!("{first} {last}"),
        }
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new()
            .with_tournament(tournament(1, (2025, 4, 10), (2025, 4, 13)))
            .with_tournament(tournament(2, (2025, 5, 15), (2025, 5, 18)))
            .with_tournament(tournament(3, (2025, 6, 12), (2025, 6, 15)))
            .with_golfer(golfer("g1", "Scottie", "Scheffler"))
            .with_golfer(golfer("g2", "Rory", "McIlroy"))
    }

    #[tokio::test]
    async fn test_tournament_selection_excludes_today() {
        let store = store();
        let today = NaiveDate::from_ymd_opt(2025, 5, 15).unwrap();

        let next = store.next_upcoming_tournament(today).await.unwrap().unwrap();
        let previous = store
            .most_recent_completed_tournament(today)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(next.tournament_id, 3);
        assert_eq!(previous.tournament_id, 1);
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_invisible() {
        let store = store();
        let mut uow = store.begin().await.unwrap();
        uow.insert_current_entry(&NewRosterEntry::current(1, "g1", 2025))
            .await
            .unwrap();

        assert!(store.roster_history(1, 2025).await.unwrap().is_empty());

        uow.commit().await.unwrap();
        assert_eq!(store.roster_history(1, 2025).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_second_current_entry_is_not_inserted() {
        let store = store();
        store.seed_roster_entry(NewRosterEntry::current(1, "g1", 2025));

        let mut uow = store.begin().await.unwrap();
        let inserted = uow
            .insert_current_entry(&NewRosterEntry::current(1, "g1", 2025))
            .await
            .unwrap();

        assert!(inserted.is_none());
    }

    #[tokio::test]
    async fn test_unknown_golfer_violates_constraint() {
        let store = store();
        let mut uow = store.begin().await.unwrap();
        let err = uow
            .insert_current_entry(&NewRosterEntry::current(1, "nobody", 2025))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let store = store();
        store.fail_next_unit_at(FailurePoint::RetireEntries);

        let mut first = store.begin().await.unwrap();
        assert!(matches!(
            first.retire_current_entries(1, 2025).await,
            Err(StorageError::Injected(_))
        ));

        let mut second = store.begin().await.unwrap();
        assert_eq!(second.retire_current_entries(1, 2025).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_closed_unit_rejects_further_calls() {
        let store = store();
        let mut uow = store.begin().await.unwrap();
        uow.rollback().await.unwrap();

        assert!(matches!(
            uow.retire_current_entries(1, 2025).await,
            Err(StorageError::UnitOfWorkClosed)
        ));
        assert!(matches!(uow.commit().await, Err(StorageError::UnitOfWorkClosed)));
    }
}
