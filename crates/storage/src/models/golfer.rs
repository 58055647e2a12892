use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::NormalizedFullName;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Golfer {
    pub golfer_id: String,
    pub feed_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

impl Golfer {
    pub fn normalized_name(&self) -> NormalizedFullName {
        NormalizedFullName::new(&self.full_name)
    }
}
