use serde::{Deserialize, Serialize};

/// Normalized form of the feed's per-golfer status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalStatus {
    #[default]
    Active,
    Cut,
    Withdrawn,
    Disqualified,
}

impl CanonicalStatus {
    /// Value stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cut => "cut",
            Self::Withdrawn => "wd",
            Self::Disqualified => "dq",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "cut" => Some(Self::Cut),
            "wd" => Some(Self::Withdrawn),
            "dq" => Some(Self::Disqualified),
            _ => None,
        }
    }
}

impl std::fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
