//! Maps feed entries onto local golfers.
//!
//! Entries are classified first (single player, team, or malformed) and then
//! dispatched: single players resolve through the feed's numeric player id,
//! team members through their normalized full name.

use std::collections::HashMap;

use storage::models::{Golfer, NormalizedFullName};
use storage::store::RosterStore;
use tracing::{debug, warn};

use crate::error::EntryIssue;
use crate::sources::sportcontent::FeedEntry;

/// Shape of a feed entry, decided before any lookup happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryIdentity {
    Single { feed_id: i64 },
    /// Full names of each member, already joined with the shared last name.
    Team { member_names: Vec<String> },
    Malformed { reason: String },
}

impl EntryIdentity {
    /// A first name containing `/` marks a team entry (`"Cameron/Patrick/"` +
    /// `"Smith"`). Team entries never carry a usable player id, so this check
    /// wins over the id.
    pub fn classify(entry: &FeedEntry) -> Self {
        let first_name = entry.first_name().trim();

        if first_name.contains('/') {
            let last_name = entry.last_name().trim();
            let tokens: Vec<&str> = first_name
                .split('/')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .collect();

            if tokens.is_empty() {
                return Self::Malformed {
                    reason: format!("team entry '{}' has no member names", first_name),
                };
            }
            if last_name.is_empty() {
                return Self::Malformed {
                    reason: format!("team entry '{}' has no last name", first_name),
                };
            }

            return Self::Team {
                member_names: tokens
                    .into_iter()
                    .map(|token| format!("{token} {last_name}"))
                    .collect(),
            };
        }

        match entry.feed_id() {
            Some(feed_id) => Self::Single { feed_id },
            None => Self::Malformed {
                reason: format!("entry '{}' has no player identifier", entry.display_name()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGolfer {
    pub golfer_id: String,
    pub full_name: String,
    pub is_team_split: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    ResolvedSingle(ResolvedGolfer),
    /// Members that resolved, in feed order. Never empty.
    ResolvedTeamMembers(Vec<ResolvedGolfer>),
    Unresolved(EntryIssue),
}

impl Resolution {
    pub fn golfers(&self) -> &[ResolvedGolfer] {
        match self {
            Self::ResolvedSingle(golfer) => std::slice::from_ref(golfer),
            Self::ResolvedTeamMembers(golfers) => golfers,
            Self::Unresolved(_) => &[],
        }
    }
}

#[derive(Debug, Clone)]
enum NameSlot {
    Unique(Golfer),
    Ambiguous,
}

/// Lookup tables over every known golfer, built once per run.
#[derive(Debug, Clone, Default)]
pub struct GolferDirectory {
    by_feed_id: HashMap<i64, Golfer>,
    by_name: HashMap<NormalizedFullName, NameSlot>,
}

impl GolferDirectory {
    pub fn new(golfers: impl IntoIterator<Item = Golfer>) -> Self {
        let mut directory = Self::default();

        for golfer in golfers {
            if let Some(feed_id) = golfer.feed_id {
                directory.by_feed_id.insert(feed_id, golfer.clone());
            }

            let name = golfer.normalized_name();
            if name.is_empty() {
                continue;
            }
            directory
                .by_name
                .entry(name)
                .and_modify(|slot| *slot = NameSlot::Ambiguous)
                .or_insert(NameSlot::Unique(golfer));
        }

        directory
    }

    pub async fn load(store: &dyn RosterStore) -> storage::Result<Self> {
        let golfers = store.list_golfers().await?;
        let directory = Self::new(golfers);
        debug!(
            "Loaded golfer directory: {} by feed id, {} by name",
            directory.by_feed_id.len(),
            directory.by_name.len()
        );
        Ok(directory)
    }

    pub fn is_empty(&self) -> bool {
        self.by_feed_id.is_empty() && self.by_name.is_empty()
    }

    /// Resolves the entry at position `index` of a feed document.
    pub fn resolve(&self, index: usize, entry: &FeedEntry) -> Resolution {
        match EntryIdentity::classify(entry) {
            EntryIdentity::Single { feed_id } => match self.by_feed_id.get(&feed_id) {
                Some(golfer) => Resolution::ResolvedSingle(ResolvedGolfer {
                    golfer_id: golfer.golfer_id.clone(),
                    full_name: golfer.full_name.clone(),
                    is_team_split: false,
                }),
                None => Resolution::Unresolved(EntryIssue::UnresolvedIdentity {
                    index,
                    identity: format!("player_id {} ({})", feed_id, entry.display_name()),
                }),
            },
            EntryIdentity::Team { member_names } => {
                let members: Vec<ResolvedGolfer> = member_names
                    .iter()
                    .filter_map(|name| self.resolve_member(index, name))
                    .collect();

                if members.is_empty() {
                    Resolution::Unresolved(EntryIssue::UnresolvedIdentity {
                        index,
                        identity: format!("team entry '{}'", entry.display_name()),
                    })
                } else {
                    Resolution::ResolvedTeamMembers(members)
                }
            }
            EntryIdentity::Malformed { reason } => {
                Resolution::Unresolved(EntryIssue::MalformedFeedEntry { index, reason })
            }
        }
    }

    fn resolve_member(&self, index: usize, full_name: &str) -> Option<ResolvedGolfer> {
        match self.by_name.get(&NormalizedFullName::new(full_name)) {
            Some(NameSlot::Unique(golfer)) => Some(ResolvedGolfer {
                golfer_id: golfer.golfer_id.clone(),
                full_name: golfer.full_name.clone(),
                is_team_split: true,
            }),
            Some(NameSlot::Ambiguous) => {
                warn!(
                    "Entry {}: team member '{}' matches several golfers, dropping",
                    index, full_name
                );
                None
            }
            None => {
                warn!("Entry {}: team member '{}' not found, dropping", index, full_name);
                None
            }
        }
    }
}
