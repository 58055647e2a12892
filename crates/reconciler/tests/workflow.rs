use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use reconciler::{
    FeedSource, ImporterError, ResultPolicy, SyncContext, TournamentSelector,
    archive::FsFeedArchive, update_tournament_field, update_tournament_results,
};
use serde_json::{Value, json};
use storage::models::{CanonicalStatus, Golfer, Placement, Tournament};
use storage::store::{InMemoryStore, RosterStore};
use tempfile::tempdir;

/// Serves canned documents and records which feed ids were requested.
struct FixtureFeed {
    field: Value,
    leaderboard: Value,
    requests: Mutex<Vec<String>>,
}

#[async_trait]
impl FeedSource for FixtureFeed {
    async fn fetch_field(&self, feed_tournament_id: i64) -> reconciler::Result<Value> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("entry-list/{feed_tournament_id}"));
        Ok(self.field.clone())
    }

    async fn fetch_results(&self, feed_tournament_id: i64) -> reconciler::Result<Value> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("leaderboard/{feed_tournament_id}"));
        Ok(self.leaderboard.clone())
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn golfer(id: &str, feed_id: Option<i64>, first: &str, last: &str) -> Golfer {
    Golfer {
        golfer_id: id.to_string(),
        feed_id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        full_name: format!("{first} {last}"),
    }
}

fn store() -> InMemoryStore {
    InMemoryStore::new()
        .with_tournament(Tournament {
            tournament_id: 1,
            feed_id: Some(640),
            name: "Zurich Classic".to_string(),
            start_date: date(2025, 4, 24),
            end_date: date(2025, 4, 27),
            format: Some("team".to_string()),
        })
        .with_tournament(Tournament {
            tournament_id: 2,
            feed_id: None,
            name: "Unlisted Invitational".to_string(),
            start_date: date(2025, 5, 1),
            end_date: date(2025, 5, 4),
            format: None,
        })
        .with_golfer(golfer("scottie", Some(101), "Scottie", "Scheffler"))
        .with_golfer(golfer("rory", Some(102), "Rory", "McIlroy"))
        .with_golfer(golfer("cam", None, "Cameron", "Smith"))
        .with_golfer(golfer("pat", None, "Patrick", "Smith"))
}

fn field_document() -> Value {
    json!({
        "results": {
            "tournament": {"id": 640, "name": "Zurich Classic of New Orleans"},
            "entry_list": [
                {"player_id": 101, "first_name": "Scottie", "last_name": "Scheffler", "country": "USA"},
                {"player_id": "102", "first_name": "Rory", "last_name": "McIlroy", "country": "NIR"},
                {"player_id": null, "first_name": "Cameron/Patrick/", "last_name": "Smith"},
                {"player_id": 999, "first_name": "Unknown", "last_name": "Amateur"}
            ]
        }
    })
}

fn leaderboard_document() -> Value {
    json!({
        "results": {
            "tournament": {"id": 640},
            "leaderboard": [
                {"position": 1, "player_id": 101, "first_name": "Scottie", "last_name": "Scheffler", "status": "active", "total_to_par": -22},
                {"position": "T3", "player_id": null, "first_name": "Cameron/Patrick/", "last_name": "Smith", "status": "active", "total_to_par": "-18"},
                {"position": "CUT", "player_id": 102, "first_name": "Rory", "last_name": "McIlroy", "status": "CUT", "total_to_par": "E"},
                {"position": "T40", "first_name": "No", "last_name": "Identifier", "status": "active"}
            ]
        }
    })
}

fn context(store: &InMemoryStore, archive_root: &std::path::Path) -> (SyncContext, Arc<FixtureFeed>) {
    let feed = Arc::new(FixtureFeed {
        field: field_document(),
        leaderboard: leaderboard_document(),
        requests: Mutex::new(Vec::new()),
    });
    let ctx = SyncContext {
        store: Arc::new(store.clone()),
        feed: feed.clone(),
        archive: Arc::new(FsFeedArchive::new(archive_root)),
    };
    (ctx, feed)
}

#[tokio::test]
async fn test_field_then_results_end_to_end() {
    let dir = tempdir().unwrap();
    let store = store();
    let (ctx, feed) = context(&store, dir.path());

    let field = update_tournament_field(&ctx, TournamentSelector::NextUpcoming, None, date(2025, 4, 20))
        .await
        .unwrap();

    assert_eq!(field.tournament.tournament_id, 1);
    assert_eq!(field.year, 2025);
    assert_eq!(field.field.entries_seen, 4);
    assert_eq!(field.field.golfers_resolved, 4);
    assert_eq!(field.field.report.inserted, 4);
    assert_eq!(field.field.issues.len(), 1);
    assert!(dir.path().join(&field.archive_key).exists());

    let results = update_tournament_results(
        &ctx,
        TournamentSelector::MostRecentCompleted,
        None,
        ResultPolicy::Accumulate,
        date(2025, 4, 28),
    )
    .await
    .unwrap();

    assert_eq!(results.report.entries_seen, 4);
    assert_eq!(results.report.created, 4);
    assert_eq!(results.report.team_split_records, 2);
    assert_eq!(results.report.issues.len(), 1);

    let records = store.results_for(1, 2025).await.unwrap();
    let team: Vec<_> = records.iter().filter(|r| r.is_team_split).collect();
    assert_eq!(team.len(), 2);
    assert!(team.iter().all(|r| r.result == Some(Placement::Label("T3".to_string()))));
    assert!(team.iter().all(|r| r.score_to_par == Some(-18)));

    let cut: Vec<_> = records
        .iter()
        .filter(|r| r.status == CanonicalStatus::Cut)
        .collect();
    assert_eq!(cut.len(), 1);
    assert_eq!(cut[0].score_to_par, Some(0));

    assert_eq!(
        *feed.requests.lock().unwrap(),
        vec!["entry-list/640".to_string(), "leaderboard/640".to_string()]
    );
}

#[tokio::test]
async fn test_results_replace_policy_keeps_one_set() {
    let dir = tempdir().unwrap();
    let store = store();
    let (ctx, _) = context(&store, dir.path());
    let by_id = TournamentSelector::ById(1);

    update_tournament_field(&ctx, by_id, None, date(2025, 6, 1))
        .await
        .unwrap();
    for _ in 0..2 {
        update_tournament_results(&ctx, by_id, None, ResultPolicy::ReplaceExisting, date(2025, 6, 1))
            .await
            .unwrap();
    }

    assert_eq!(store.results_for(1, 2025).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_year_override_targets_a_separate_roster() {
    let dir = tempdir().unwrap();
    let store = store();
    let (ctx, _) = context(&store, dir.path());

    let summary = update_tournament_field(&ctx, TournamentSelector::ById(1), Some(2026), date(2025, 1, 1))
        .await
        .unwrap();

    assert_eq!(summary.year, 2026);
    assert!(store.roster_history(1, 2025).await.unwrap().is_empty());
    assert_eq!(store.roster_history(1, 2026).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_selection_errors() {
    let dir = tempdir().unwrap();
    let store = store();
    let (ctx, feed) = context(&store, dir.path());

    let missing_feed = update_tournament_field(&ctx, TournamentSelector::ById(2), None, date(2025, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(missing_feed, ImporterError::MissingFeedId(2)));

    let none_upcoming =
        update_tournament_field(&ctx, TournamentSelector::NextUpcoming, None, date(2026, 1, 1))
            .await
            .unwrap_err();
    assert!(matches!(none_upcoming, ImporterError::NoTournament(_)));

    assert!(feed.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_archive_failure_aborts_before_any_write() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, b"occupied").unwrap();
    let store = store();
    let (ctx, _) = context(&store, &blocker);

    let err = update_tournament_field(&ctx, TournamentSelector::ById(1), None, date(2025, 4, 20))
        .await
        .unwrap_err();

    assert!(matches!(err, ImporterError::ArchiveError(_)));
    assert!(store.roster_history(1, 2025).await.unwrap().is_empty());
}
