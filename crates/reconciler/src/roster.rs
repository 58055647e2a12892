use std::collections::HashSet;
use std::sync::Arc;

use storage::models::NewRosterEntry;
use storage::store::{RosterStore, UnitOfWork};
use tracing::{debug, info, warn};

use crate::error::{EntryIssue, SyncError};
use crate::identity::{GolferDirectory, Resolution};
use crate::sources::sportcontent::{FeedEntry, FeedItem};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Entries that were current before this snapshot.
    pub retired: u64,
    pub inserted: usize,
    /// Golfers listed more than once; only the first listing counts.
    pub duplicates: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSync {
    pub entries_seen: usize,
    pub golfers_resolved: usize,
    pub issues: Vec<EntryIssue>,
    pub report: SyncReport,
}

/// Replaces the current roster of a tournament-year with a new snapshot.
///
/// Previous entries are retired rather than deleted, and the retire and insert
/// steps share one unit of work.
pub struct RosterSynchronizer {
    store: Arc<dyn RosterStore>,
}

impl RosterSynchronizer {
    pub fn new(store: Arc<dyn RosterStore>) -> Self {
        Self { store }
    }

    /// Retires every current entry for the tournament-year, then inserts one
    /// current entry per distinct golfer. An empty snapshot still retires.
    pub async fn sync_field(
        &self,
        tournament_id: i32,
        year: i32,
        golfer_ids: &[String],
    ) -> Result<SyncReport, SyncError> {
        let fail = |source| SyncError {
            tournament_id,
            year,
            source,
        };

        let mut uow = self.store.begin().await.map_err(fail)?;

        match write_snapshot(uow.as_mut(), tournament_id, year, golfer_ids).await {
            Ok(report) => {
                uow.commit().await.map_err(fail)?;
                info!(
                    "Roster for tournament {} ({}): retired {}, inserted {}, {} duplicate(s)",
                    tournament_id, year, report.retired, report.inserted, report.duplicates
                );
                Ok(report)
            }
            Err(source) => {
                if let Err(e) = uow.rollback().await {
                    warn!("Rollback after failed roster sync also failed: {}", e);
                }
                Err(fail(source))
            }
        }
    }

    /// Resolves each field entry and syncs the golfers that resolved.
    /// Malformed and unresolvable entries are reported and left out of the snapshot.
    pub async fn sync_entries(
        &self,
        directory: &GolferDirectory,
        tournament_id: i32,
        year: i32,
        entries: &[FeedItem<FeedEntry>],
    ) -> Result<FieldSync, SyncError> {
        let mut golfer_ids = Vec::with_capacity(entries.len());
        let mut issues = Vec::new();

        for (index, item) in entries.iter().enumerate() {
            let resolution = match item.parsed_or_issue(index) {
                Ok(entry) => directory.resolve(index, entry),
                Err(issue) => Resolution::Unresolved(issue),
            };

            match resolution {
                Resolution::Unresolved(issue) => {
                    warn!("Skipping field entry: {}", issue);
                    issues.push(issue);
                }
                resolution => {
                    for golfer in resolution.golfers() {
                        debug!("Entry {} resolved to {}", index, golfer.full_name);
                        golfer_ids.push(golfer.golfer_id.clone());
                    }
                }
            }
        }

        let report = self.sync_field(tournament_id, year, &golfer_ids).await?;

        Ok(FieldSync {
            entries_seen: entries.len(),
            golfers_resolved: golfer_ids.len(),
            issues,
            report,
        })
    }
}

async fn write_snapshot(
    uow: &mut dyn UnitOfWork,
    tournament_id: i32,
    year: i32,
    golfer_ids: &[String],
) -> storage::Result<SyncReport> {
    let mut report = SyncReport {
        retired: uow.retire_current_entries(tournament_id, year).await?,
        ..SyncReport::default()
    };

    let mut seen = HashSet::new();
    for golfer_id in golfer_ids {
        if !seen.insert(golfer_id.as_str()) {
            report.duplicates += 1;
            continue;
        }

        let entry = NewRosterEntry::current(tournament_id, golfer_id.as_str(), year);
        match uow.insert_current_entry(&entry).await? {
            Some(_) => report.inserted += 1,
            None => report.duplicates += 1,
        }
    }

    Ok(report)
}
