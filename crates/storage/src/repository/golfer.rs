use sqlx::PgPool;

use crate::error::Result;
use crate::models::Golfer;

pub struct GolferRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GolferRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Golfer>> {
        let golfers = sqlx::query_as::<_, Golfer>(
            r#"
            SELECT golfer_id, feed_id, first_name, last_name, full_name
            FROM golfers
            ORDER BY last_name, first_name, golfer_id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(golfers)
    }
}
