use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tournament {
    pub tournament_id: i32,
    /// SportContent tournament identifier, absent for tournaments the feed does not cover.
    pub feed_id: Option<i64>,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub format: Option<String>,
}

impl Tournament {
    /// Calendar year the tournament's roster and results are filed under.
    pub fn season_year(&self) -> i32 {
        self.start_date.year()
    }
}
