pub mod archive;
pub mod config;
pub mod error;
pub mod identity;
pub mod results;
pub mod roster;
pub mod sources;
pub mod status;
pub mod traits;
pub mod workflow;

pub use error::{EntryIssue, ImporterError, ReconcileError, Result, SyncError};
pub use identity::{GolferDirectory, Resolution};
pub use results::{ResultPolicy, ResultReconciler};
pub use roster::RosterSynchronizer;
pub use traits::{FeedSource, SyncContext};
pub use workflow::{TournamentSelector, update_tournament_field, update_tournament_results};
