use std::collections::HashSet;
use std::sync::Arc;

use storage::models::NewResultRecord;
use storage::store::{RosterStore, UnitOfWork};
use tracing::{info, warn};

use crate::error::{EntryIssue, ReconcileError};
use crate::identity::{GolferDirectory, Resolution};
use crate::sources::sportcontent::{FeedItem, FeedResult};
use crate::status::{SportContentStatusMapper, StatusMapper};

/// What to do with results already recorded for the tournament-year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultPolicy {
    /// Keep prior results; a re-run adds another set.
    #[default]
    Accumulate,
    /// Delete prior results in the same unit of work before inserting.
    ReplaceExisting,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub entries_seen: usize,
    pub created: usize,
    pub team_split_records: usize,
    /// Prior results removed under [`ResultPolicy::ReplaceExisting`].
    pub replaced: u64,
    pub issues: Vec<EntryIssue>,
}

/// Attaches leaderboard results to the current roster entries of a tournament-year.
pub struct ResultReconciler {
    store: Arc<dyn RosterStore>,
    mapper: Box<dyn StatusMapper>,
}

impl ResultReconciler {
    pub fn new(store: Arc<dyn RosterStore>) -> Self {
        Self {
            store,
            mapper: Box::new(SportContentStatusMapper),
        }
    }

    pub fn with_mapper(mut self, mapper: impl StatusMapper + 'static) -> Self {
        self.mapper = Box::new(mapper);
        self
    }

    /// Creates one result per resolved golfer that holds a current roster entry.
    /// A roster entry gets at most one result per call; the first entry naming
    /// the golfer wins.
    ///
    /// Malformed and unresolvable entries, and golfers missing from the roster,
    /// are reported in the returned [`ReconcileReport`] and skipped. A store
    /// failure discards the whole batch.
    pub async fn apply_results(
        &self,
        directory: &GolferDirectory,
        tournament_id: i32,
        year: i32,
        results: &[FeedItem<FeedResult>],
        policy: ResultPolicy,
    ) -> Result<ReconcileReport, ReconcileError> {
        let fail = |source| ReconcileError {
            tournament_id,
            year,
            source,
        };

        let mut uow = self.store.begin().await.map_err(fail)?;

        match self
            .write_results(uow.as_mut(), directory, tournament_id, year, results, policy)
            .await
        {
            Ok(report) => {
                uow.commit().await.map_err(fail)?;
                info!(
                    "Results for tournament {} ({}): {} created from {} entries, {} skipped",
                    tournament_id,
                    year,
                    report.created,
                    report.entries_seen,
                    report.issues.len()
                );
                Ok(report)
            }
            Err(source) => {
                if let Err(e) = uow.rollback().await {
                    warn!("Rollback after failed result reconciliation also failed: {}", e);
                }
                Err(fail(source))
            }
        }
    }

    async fn write_results(
        &self,
        uow: &mut dyn UnitOfWork,
        directory: &GolferDirectory,
        tournament_id: i32,
        year: i32,
        results: &[FeedItem<FeedResult>],
        policy: ResultPolicy,
    ) -> storage::Result<ReconcileReport> {
        let mut report = ReconcileReport {
            entries_seen: results.len(),
            ..ReconcileReport::default()
        };

        if policy == ResultPolicy::ReplaceExisting {
            report.replaced = uow.delete_results(tournament_id, year).await?;
            info!(
                "Removed {} prior result(s) for tournament {} ({})",
                report.replaced, tournament_id, year
            );
        }

        let mut written = HashSet::new();

        for (index, item) in results.iter().enumerate() {
            let result = match item.parsed_or_issue(index) {
                Ok(result) => result,
                Err(issue) => {
                    warn!("Skipping leaderboard entry: {}", issue);
                    report.issues.push(issue);
                    continue;
                }
            };

            let resolution = directory.resolve(index, &result.entry);
            if let Resolution::Unresolved(issue) = resolution {
                warn!("Skipping leaderboard entry: {}", issue);
                report.issues.push(issue);
                continue;
            }

            let status = self.mapper.map_status(result.raw_status());
            let placement = result.placement();
            let score_to_par = result.score_to_par();

            for golfer in resolution.golfers() {
                let Some(entry) = uow
                    .find_current_entry(tournament_id, &golfer.golfer_id, year)
                    .await?
                else {
                    let issue = EntryIssue::MissingRosterEntry {
                        index,
                        golfer_id: golfer.golfer_id.clone(),
                    };
                    warn!("Skipping result for {}: {}", golfer.full_name, issue);
                    report.issues.push(issue);
                    continue;
                };

                if !written.insert(entry.roster_entry_id) {
                    let issue = EntryIssue::DuplicateResult {
                        index,
                        golfer_id: golfer.golfer_id.clone(),
                    };
                    warn!("Skipping result for {}: {}", golfer.full_name, issue);
                    report.issues.push(issue);
                    continue;
                }

                uow.insert_result(&NewResultRecord {
                    roster_entry_id: entry.roster_entry_id,
                    result: placement.clone(),
                    status,
                    score_to_par,
                    is_team_split: golfer.is_team_split,
                })
                .await?;

                report.created += 1;
                if golfer.is_team_split {
                    report.team_split_records += 1;
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use storage::StorageError;
    use storage::models::{CanonicalStatus, Golfer, NewRosterEntry, Placement, Tournament};
    use storage::store::{FailurePoint, InMemoryStore};

    use crate::sources::sportcontent::{FeedEntry, RawPlayerId, RawScore};

    const T: i32 = 3;
    const YEAR: i32 = 2025;

    fn golfer(id: &str, feed_id: Option<i64>, first: &str, last: &str) -> Golfer {
        Golfer {
            golfer_id: id.to_string(),
            feed_id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            full_name: format!("{first} {last}"),
        }
    }

    fn result(
        player_id: Option<i64>,
        first: &str,
        last: &str,
        position: Placement,
        status: &str,
        to_par: Option<i64>,
    ) -> FeedItem<FeedResult> {
        FeedItem::Parsed(FeedResult {
            entry: FeedEntry {
                player_id: player_id.map(RawPlayerId::Number),
                first_name: Some(first.to_string()),
                last_name: Some(last.to_string()),
                country: None,
            },
            position: Some(position),
            status: Some(status.to_string()),
            total_to_par: to_par.map(RawScore::Number),
        })
    }

    fn label(value: &str) -> Placement {
        Placement::Label(value.to_string())
    }

    /// Store with a synced field of four golfers and one golfer not entered.
    fn setup() -> (InMemoryStore, GolferDirectory) {
        let golfers = vec![
            golfer("cam", Some(5), "Cameron", "Smith"),
            golfer("pat", None, "Patrick", "Smith"),
            golfer("scottie", Some(101), "Scottie", "Scheffler"),
            golfer("rory", Some(102), "Rory", "McIlroy"),
            golfer("late", Some(103), "Late", "Entrant"),
        ];
        let mut store = InMemoryStore::new().with_tournament(Tournament {
            tournament_id: T,
            feed_id: Some(500),
            name: "Zurich Classic".to_string(),
            start_date: NaiveDate::from_ymd_opt(YEAR, 4, 24).unwrap(),
            end_date: NaiveDate::from_ymd_opt(YEAR, 4, 27).unwrap(),
            format: Some("team".to_string()),
        });
        for g in &golfers {
            store = store.with_golfer(g.clone());
        }
        for id in ["cam", "pat", "scottie", "rory"] {
            store.seed_roster_entry(NewRosterEntry::current(T, id, YEAR));
        }
        (store, GolferDirectory::new(golfers))
    }

    #[tokio::test]
    async fn test_team_entry_shares_one_placement() {
        let (store, directory) = setup();
        let reconciler = ResultReconciler::new(Arc::new(store.clone()));

        let report = reconciler
            .apply_results(
                &directory,
                T,
                YEAR,
                &[result(None, "Cameron/Patrick", "Smith", label("T3"), "active", Some(-20))],
                ResultPolicy::Accumulate,
            )
            .await
            .unwrap();

        let records = store.results_for(T, YEAR).await.unwrap();
        assert_eq!(report.created, 2);
        assert_eq!(report.team_split_records, 2);
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.result, Some(label("T3")));
            assert_eq!(record.status, CanonicalStatus::Active);
            assert_eq!(record.score_to_par, Some(-20));
            assert!(record.is_team_split);
        }
    }

    #[tokio::test]
    async fn test_unresolvable_entry_creates_nothing() {
        let (store, directory) = setup();
        let reconciler = ResultReconciler::new(Arc::new(store.clone()));

        let report = reconciler
            .apply_results(
                &directory,
                T,
                YEAR,
                &[result(Some(999), "Ghost", "Player", Placement::Numeric(1), "", None)],
                ResultPolicy::Accumulate,
            )
            .await
            .unwrap();

        assert_eq!(report.created, 0);
        assert!(matches!(
            report.issues.as_slice(),
            [EntryIssue::UnresolvedIdentity { index: 0, .. }]
        ));
        assert!(store.results_for(T, YEAR).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_placements_are_kept_verbatim() {
        let (store, directory) = setup();
        let reconciler = ResultReconciler::new(Arc::new(store.clone()));

        reconciler
            .apply_results(
                &directory,
                T,
                YEAR,
                &[
                    result(Some(101), "Scottie", "Scheffler", Placement::Numeric(1), "active", Some(-11)),
                    result(Some(102), "Rory", "McIlroy", label("T89"), "CUT", Some(4)),
                ],
                ResultPolicy::Accumulate,
            )
            .await
            .unwrap();

        let mut placements: Vec<(Option<Placement>, CanonicalStatus)> = store
            .results_for(T, YEAR)
            .await
            .unwrap()
            .into_iter()
            .map(|r| (r.result, r.status))
            .collect();
        placements.sort_by_key(|(p, _)| p.as_ref().map(ToString::to_string));

        assert_eq!(
            placements,
            vec![
                (Some(Placement::Numeric(1)), CanonicalStatus::Active),
                (Some(label("T89")), CanonicalStatus::Cut),
            ]
        );
    }

    #[tokio::test]
    async fn test_golfer_without_roster_entry_is_skipped() {
        let (store, directory) = setup();
        let reconciler = ResultReconciler::new(Arc::new(store.clone()));

        let report = reconciler
            .apply_results(
                &directory,
                T,
                YEAR,
                &[
                    result(Some(103), "Late", "Entrant", label("T40"), "active", Some(0)),
                    result(Some(101), "Scottie", "Scheffler", Placement::Numeric(1), "active", Some(-11)),
                ],
                ResultPolicy::Accumulate,
            )
            .await
            .unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(
            report.issues,
            vec![EntryIssue::MissingRosterEntry {
                index: 0,
                golfer_id: "late".to_string()
            }]
        );
        assert_eq!(store.roster_history(T, YEAR).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_rerun_accumulates_by_default_and_replaces_on_request() {
        let (store, directory) = setup();
        let reconciler = ResultReconciler::new(Arc::new(store.clone()));
        let board = [result(Some(101), "Scottie", "Scheffler", Placement::Numeric(1), "active", Some(-11))];

        for _ in 0..2 {
            reconciler
                .apply_results(&directory, T, YEAR, &board, ResultPolicy::Accumulate)
                .await
                .unwrap();
        }
        assert_eq!(store.results_for(T, YEAR).await.unwrap().len(), 2);

        let report = reconciler
            .apply_results(&directory, T, YEAR, &board, ResultPolicy::ReplaceExisting)
            .await
            .unwrap();
        assert_eq!(report.replaced, 2);
        assert_eq!(store.results_for(T, YEAR).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_discards_whole_batch() {
        let (store, directory) = setup();
        let reconciler = ResultReconciler::new(Arc::new(store.clone()));
        let board = [result(Some(101), "Scottie", "Scheffler", Placement::Numeric(1), "active", Some(-11))];
        reconciler
            .apply_results(&directory, T, YEAR, &board, ResultPolicy::Accumulate)
            .await
            .unwrap();

        store.fail_next_unit_at(FailurePoint::InsertResult);
        let err = reconciler
            .apply_results(&directory, T, YEAR, &board, ResultPolicy::ReplaceExisting)
            .await
            .unwrap_err();

        assert!(matches!(err.source, StorageError::Injected(_)));
        assert_eq!(store.results_for(T, YEAR).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_status_mapper_is_used() {
        struct AllCut;
        impl StatusMapper for AllCut {
            fn map_status(&self, _raw_status: &str) -> CanonicalStatus {
                CanonicalStatus::Cut
            }
        }

        let (store, directory) = setup();
        let reconciler = ResultReconciler::new(Arc::new(store.clone())).with_mapper(AllCut);
        reconciler
            .apply_results(
                &directory,
                T,
                YEAR,
                &[result(Some(102), "Rory", "McIlroy", label("T5"), "active", None)],
                ResultPolicy::Accumulate,
            )
            .await
            .unwrap();

        let records = store.results_for(T, YEAR).await.unwrap();
        assert_eq!(records[0].status, CanonicalStatus::Cut);
        assert_eq!(records[0].score_to_par, None);
    }

    #[tokio::test]
    async fn test_golfer_named_twice_gets_one_result() {
        let (store, directory) = setup();
        let reconciler = ResultReconciler::new(Arc::new(store.clone()));

        let report = reconciler
            .apply_results(
                &directory,
                T,
                YEAR,
                &[
                    result(None, "Cameron/Patrick/", "Smith", label("T3"), "active", Some(-20)),
                    result(Some(5), "Cameron", "Smith", Placement::Numeric(12), "active", Some(-9)),
                ],
                ResultPolicy::Accumulate,
            )
            .await
            .unwrap();

        assert_eq!(report.created, 2);
        assert_eq!(
            report.issues,
            vec![EntryIssue::DuplicateResult {
                index: 1,
                golfer_id: "cam".to_string()
            }]
        );

        let cam = store
            .roster_history(T, YEAR)
            .await
            .unwrap()
            .into_iter()
            .find(|e| e.golfer_id == "cam")
            .unwrap();
        let cam_results: Vec<_> = store
            .results_for(T, YEAR)
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.roster_entry_id == cam.roster_entry_id)
            .collect();
        assert_eq!(cam_results.len(), 1);
        assert_eq!(cam_results[0].result, Some(label("T3")));
    }

    #[tokio::test]
    async fn test_malformed_entry_is_reported_and_the_rest_applied() {
        let (store, directory) = setup();
        let reconciler = ResultReconciler::new(Arc::new(store.clone()));
        let board: Vec<FeedItem<FeedResult>> = serde_json::from_value(serde_json::json!([
            {"player_id": 101, "first_name": "Scottie", "last_name": "Scheffler",
             "position": 1, "status": "active", "total_to_par": -11},
            {"player_id": 102, "first_name": {"given": "Rory"}, "last_name": "McIlroy",
             "position": "T2", "status": "active", "total_to_par": -3.0}
        ]))
        .unwrap();

        let report = reconciler
            .apply_results(&directory, T, YEAR, &board, ResultPolicy::Accumulate)
            .await
            .unwrap();

        assert_eq!(report.entries_seen, 2);
        assert_eq!(report.created, 1);
        assert!(matches!(
            report.issues.as_slice(),
            [EntryIssue::MalformedFeedEntry { index: 1, .. }]
        ));
        let records = store.results_for(T, YEAR).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].result, Some(Placement::Numeric(1)));
    }
}
