use storage::models::CanonicalStatus;

pub trait StatusMapper: Send + Sync {
    fn map_status(&self, raw_status: &str) -> CanonicalStatus;
}

/// Status vocabulary of the SportContent leaderboard.
///
/// Unknown tokens, including empty ones, fall back to `Active`.
pub struct SportContentStatusMapper;

impl StatusMapper for SportContentStatusMapper {
    fn map_status(&self, raw_status: &str) -> CanonicalStatus {
        match raw_status.trim().to_lowercase().as_str() {
            "cut" => CanonicalStatus::Cut,
            "wd" => CanonicalStatus::Withdrawn,
            "dq" | "dsq" => CanonicalStatus::Disqualified,
            _ => CanonicalStatus::Active,
        }
    }
}

pub fn normalize(raw_status: &str) -> CanonicalStatus {
    SportContentStatusMapper.map_status(raw_status)
}
