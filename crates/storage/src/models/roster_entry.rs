use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One golfer's participation record for a tournament-year.
///
/// Rows are never deleted. A new field snapshot retires the previous rows
/// (`is_current = false`) and inserts fresh current ones, so at most one row per
/// `(tournament_id, golfer_id, year)` is current at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RosterEntry {
    pub roster_entry_id: Uuid,
    pub tournament_id: i32,
    pub golfer_id: String,
    pub year: i32,
    pub is_current: bool,
    pub is_active: bool,
    pub is_alternate: bool,
    pub is_injured: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRosterEntry {
    pub tournament_id: i32,
    pub golfer_id: String,
    pub year: i32,
    pub is_active: bool,
    pub is_alternate: bool,
    pub is_injured: bool,
}

impl NewRosterEntry {
    /// An active entry from the latest field snapshot.
    pub fn current(tournament_id: i32, golfer_id: impl Into<String>, year: i32) -> Self {
        Self {
            tournament_id,
            golfer_id: golfer_id.into(),
            year,
            is_active: true,
            is_alternate: false,
            is_injured: false,
        }
    }

    pub fn into_entry(self, roster_entry_id: Uuid, updated_at: DateTime<Utc>) -> RosterEntry {
        RosterEntry {
            roster_entry_id,
            tournament_id: self.tournament_id,
            golfer_id: self.golfer_id,
            year: self.year,
            is_current: true,
            is_active: self.is_active,
            is_alternate: self.is_alternate,
            is_injured: self.is_injured,
            updated_at,
        }
    }
}
