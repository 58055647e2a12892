use serde::{Deserialize, Serialize};
use serde_json::Value;
use storage::models::Placement;

use crate::error::EntryIssue;

/// One element of a feed list. Elements that do not fit the expected shape are
/// kept raw so a single bad entry cannot sink the whole document.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum FeedItem<T> {
    Parsed(T),
    Malformed(Value),
}

impl<T> FeedItem<T> {
    pub fn parsed(&self) -> Option<&T> {
        match self {
            Self::Parsed(item) => Some(item),
            Self::Malformed(_) => None,
        }
    }

    /// The parsed element, or the issue describing the element at `index`.
    pub fn parsed_or_issue(&self, index: usize) -> Result<&T, EntryIssue> {
        match self {
            Self::Parsed(item) => Ok(item),
            Self::Malformed(raw) => Err(EntryIssue::MalformedFeedEntry {
                index,
                reason: format!("unparseable entry {raw}"),
            }),
        }
    }
}

impl<T> From<T> for FeedItem<T> {
    fn from(item: T) -> Self {
        Self::Parsed(item)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FieldDocument {
    #[serde(default)]
    pub results: FieldResults,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FieldResults {
    #[serde(default)]
    pub tournament: Option<FeedTournament>,
    #[serde(default)]
    pub entry_list: Vec<FeedItem<FeedEntry>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ResultsDocument {
    #[serde(default)]
    pub results: LeaderboardResults,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LeaderboardResults {
    #[serde(default)]
    pub tournament: Option<FeedTournament>,
    #[serde(default)]
    pub leaderboard: Vec<FeedItem<FeedResult>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FeedTournament {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub status: Option<String>,
}

/// Player identifiers arrive as numbers on some endpoints and strings on others.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawPlayerId {
    Number(i64),
    Text(String),
    Other(Value),
}

impl RawPlayerId {
    /// `None` for strings that are not numeric.
    pub fn as_feed_id(&self) -> Option<i64> {
        match self {
            Self::Number(id) => Some(*id),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Other(_) => None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct FeedEntry {
    #[serde(default)]
    pub player_id: Option<RawPlayerId>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl FeedEntry {
    pub fn feed_id(&self) -> Option<i64> {
        self.player_id.as_ref().and_then(RawPlayerId::as_feed_id)
    }

    pub fn first_name(&self) -> &str {
        self.first_name.as_deref().unwrap_or_default()
    }

    pub fn last_name(&self) -> &str {
        self.last_name.as_deref().unwrap_or_default()
    }

    /// Name as the feed printed it, for log lines.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name().trim(), self.last_name().trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawScore {
    Number(i64),
    Text(String),
    Other(Value),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FeedResult {
    #[serde(flatten)]
    pub entry: FeedEntry,
    #[serde(default)]
    pub position: Option<Placement>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_to_par: Option<RawScore>,
}

impl FeedResult {
    /// Position as reported, with blank labels treated as absent.
    pub fn placement(&self) -> Option<Placement> {
        match &self.position {
            Some(Placement::Label(label)) if label.trim().is_empty() => None,
            other => other.clone(),
        }
    }

    pub fn raw_status(&self) -> &str {
        self.status.as_deref().unwrap_or_default()
    }

    /// Score relative to par. `"E"` is even par and whole floats (`-3.0`) count;
    /// anything else is `None`.
    pub fn score_to_par(&self) -> Option<i32> {
        match self.total_to_par.as_ref()? {
            RawScore::Number(n) => i32::try_from(*n).ok(),
            RawScore::Text(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("e") {
                    Some(0)
                } else {
                    text.parse().ok()
                }
            }
            RawScore::Other(value) => value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && (i32::MIN as f64..=i32::MAX as f64).contains(f))
                .map(|f| f as i32),
        }
    }
}
