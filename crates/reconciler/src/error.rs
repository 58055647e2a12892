use storage::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImporterError>;

#[derive(Error, Debug)]
pub enum ImporterError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error(transparent)]
    SyncError(#[from] SyncError),

    #[error(transparent)]
    ReconcileError(#[from] ReconcileError),

    #[error("Failed to archive feed document: {0}")]
    ArchiveError(#[from] std::io::Error),

    #[error("No tournament found: {0}")]
    NoTournament(String),

    #[error("Tournament {0} has no feed identifier")]
    MissingFeedId(i32),
}

/// The roster snapshot for a tournament-year could not be committed.
/// Nothing from the attempted snapshot was persisted.
#[derive(Error, Debug)]
#[error("Roster sync failed for tournament {tournament_id} ({year}): {source}")]
pub struct SyncError {
    pub tournament_id: i32,
    pub year: i32,
    #[source]
    pub source: StorageError,
}

/// The result batch for a tournament-year could not be committed.
/// Nothing from the attempted batch was persisted.
#[derive(Error, Debug)]
#[error("Result reconciliation failed for tournament {tournament_id} ({year}): {source}")]
pub struct ReconcileError {
    pub tournament_id: i32,
    pub year: i32,
    #[source]
    pub source: StorageError,
}

/// A per-entry problem. The entry is skipped and the run carries on.
///
/// `index` is the entry's position in the feed document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryIssue {
    #[error("entry {index}: no golfer matches {identity}")]
    UnresolvedIdentity { index: usize, identity: String },

    #[error("entry {index}: golfer {golfer_id} has no current roster entry")]
    MissingRosterEntry { index: usize, golfer_id: String },

    #[error("entry {index}: {reason}")]
    MalformedFeedEntry { index: usize, reason: String },

    #[error("entry {index}: golfer {golfer_id} already has a result from an earlier entry")]
    DuplicateResult { index: usize, golfer_id: String },
}

impl EntryIssue {
    pub fn index(&self) -> usize {
        match self {
            Self::UnresolvedIdentity { index, .. }
            | Self::MissingRosterEntry { index, .. }
            | Self::MalformedFeedEntry { index, .. }
            | Self::DuplicateResult { index, .. } => *index,
        }
    }
}
