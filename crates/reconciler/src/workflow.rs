use std::fmt;

use chrono::NaiveDate;
use storage::models::Tournament;
use storage::store::RosterStore;
use tracing::{info, warn};

use crate::archive::FeedCollection;
use crate::error::{ImporterError, Result};
use crate::identity::GolferDirectory;
use crate::results::{ReconcileReport, ResultPolicy, ResultReconciler};
use crate::roster::{FieldSync, RosterSynchronizer};
use crate::sources::sportcontent::{FeedTournament, FieldDocument, ResultsDocument};
use crate::traits::SyncContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TournamentSelector {
    /// Earliest tournament starting after today.
    NextUpcoming,
    /// Latest tournament that ended before today.
    MostRecentCompleted,
    ById(i32),
}

impl TournamentSelector {
    pub fn or_id(self, tournament_id: Option<i32>) -> Self {
        tournament_id.map_or(self, Self::ById)
    }
}

pub async fn select_tournament(
    store: &dyn RosterStore,
    selector: TournamentSelector,
    today: NaiveDate,
) -> Result<Tournament> {
    let found = match selector {
        TournamentSelector::NextUpcoming => store.next_upcoming_tournament(today).await?,
        TournamentSelector::MostRecentCompleted => {
            store.most_recent_completed_tournament(today).await?
        }
        TournamentSelector::ById(id) => store.find_tournament(id).await?,
    };

    found.ok_or_else(|| {
        ImporterError::NoTournament(match selector {
            TournamentSelector::NextUpcoming => format!("no tournament starts after {today}"),
            TournamentSelector::MostRecentCompleted => format!("no tournament ended before {today}"),
            TournamentSelector::ById(id) => format!("tournament {id} does not exist"),
        })
    })
}

#[derive(Debug, Clone)]
pub struct FieldUpdateSummary {
    pub tournament: Tournament,
    pub year: i32,
    pub archive_key: String,
    pub field: FieldSync,
}

impl fmt::Display for FieldUpdateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} entries, {} golfers resolved, {} retired, {} inserted, {} issue(s)",
            self.tournament.name,
            self.year,
            self.field.entries_seen,
            self.field.golfers_resolved,
            self.field.report.retired,
            self.field.report.inserted,
            self.field.issues.len()
        )
    }
}

#[derive(Debug, Clone)]
pub struct ResultsUpdateSummary {
    pub tournament: Tournament,
    pub year: i32,
    pub archive_key: String,
    pub policy: ResultPolicy,
    pub report: ReconcileReport,
}

impl fmt::Display for ResultsUpdateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} entries, {} results created, {} replaced, {} issue(s)",
            self.tournament.name,
            self.year,
            self.report.entries_seen,
            self.report.created,
            self.report.replaced,
            self.report.issues.len()
        )
    }
}

fn feed_id_of(tournament: &Tournament) -> Result<i64> {
    tournament
        .feed_id
        .ok_or(ImporterError::MissingFeedId(tournament.tournament_id))
}

fn check_feed_tournament(expected: i64, reported: Option<&FeedTournament>) {
    if let Some(id) = reported.and_then(|t| t.id) {
        if id != expected {
            warn!("Feed document reports tournament {} but {} was requested", id, expected);
        }
    }
}

async fn load_directory(store: &dyn RosterStore) -> Result<GolferDirectory> {
    let directory = GolferDirectory::load(store).await?;
    if directory.is_empty() {
        warn!("No golfers in the store, every feed entry will be unresolved");
    }
    Ok(directory)
}

/// Fetches the field of the selected tournament, archives it and makes it the
/// current roster. `year` defaults to the tournament's start year.
pub async fn update_tournament_field(
    ctx: &SyncContext,
    selector: TournamentSelector,
    year: Option<i32>,
    today: NaiveDate,
) -> Result<FieldUpdateSummary> {
    let tournament = select_tournament(ctx.store.as_ref(), selector, today).await?;
    let feed_id = feed_id_of(&tournament)?;
    let year = year.unwrap_or_else(|| tournament.season_year());

    info!(
        "Updating field for '{}' (tournament {}, feed {}, year {}) from {}",
        tournament.name,
        tournament.tournament_id,
        feed_id,
        year,
        ctx.feed.name()
    );

    let raw = ctx.feed.fetch_field(feed_id).await?;
    let archive_key = ctx
        .archive
        .archive(FeedCollection::TournamentFields, feed_id, &raw)
        .await?;

    let document: FieldDocument = serde_json::from_value(raw)?;
    check_feed_tournament(feed_id, document.results.tournament.as_ref());

    let directory = load_directory(ctx.store.as_ref()).await?;
    let field = RosterSynchronizer::new(ctx.store.clone())
        .sync_entries(
            &directory,
            tournament.tournament_id,
            year,
            &document.results.entry_list,
        )
        .await?;

    Ok(FieldUpdateSummary {
        tournament,
        year,
        archive_key,
        field,
    })
}

/// Fetches the leaderboard of the selected tournament, archives it and attaches
/// results to the current roster. `year` defaults to the tournament's start year.
pub async fn update_tournament_results(
    ctx: &SyncContext,
    selector: TournamentSelector,
    year: Option<i32>,
    policy: ResultPolicy,
    today: NaiveDate,
) -> Result<ResultsUpdateSummary> {
    let tournament = select_tournament(ctx.store.as_ref(), selector, today).await?;
    let feed_id = feed_id_of(&tournament)?;
    let year = year.unwrap_or_else(|| tournament.season_year());

    info!(
        "Updating results for '{}' (tournament {}, feed {}, year {}, {:?}) from {}",
        tournament.name,
        tournament.tournament_id,
        feed_id,
        year,
        policy,
        ctx.feed.name()
    );

    let raw = ctx.feed.fetch_results(feed_id).await?;
    let archive_key = ctx
        .archive
        .archive(FeedCollection::TournamentResults, feed_id, &raw)
        .await?;

    let document: ResultsDocument = serde_json::from_value(raw)?;
    check_feed_tournament(feed_id, document.results.tournament.as_ref());

    let directory = load_directory(ctx.store.as_ref()).await?;
    let report = ResultReconciler::new(ctx.store.clone())
        .apply_results(
            &directory,
            tournament.tournament_id,
            year,
            &document.results.leaderboard,
            policy,
        )
        .await?;

    Ok(ResultsUpdateSummary {
        tournament,
        year,
        archive_key,
        policy,
        report,
    })
}
