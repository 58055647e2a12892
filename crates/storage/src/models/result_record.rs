use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CanonicalStatus;

/// Finish position exactly as the feed reported it.
///
/// Leaderboards mix plain numbers (`1`) with placement labels (`"T3"`, `"CUT"`),
/// and both are kept as given rather than coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Placement {
    Numeric(i64),
    Label(String),
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

/// A finish attached to the roster entry that was current when results were reconciled.
/// Never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub result_id: Uuid,
    pub roster_entry_id: Uuid,
    pub result: Option<Placement>,
    pub status: CanonicalStatus,
    pub score_to_par: Option<i32>,
    pub is_team_split: bool,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResultRecord {
    pub roster_entry_id: Uuid,
    pub result: Option<Placement>,
    pub status: CanonicalStatus,
    pub score_to_par: Option<i32>,
    pub is_team_split: bool,
}

impl NewResultRecord {
    pub fn into_record(self, result_id: Uuid, recorded_at: DateTime<Utc>) -> ResultRecord {
        ResultRecord {
            result_id,
            roster_entry_id: self.roster_entry_id,
            result: self.result,
            status: self.status,
            score_to_par: self.score_to_par,
            is_team_split: self.is_team_split,
            recorded_at,
        }
    }
}
