use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use storage::store::RosterStore;

use crate::Result;
use crate::archive::FeedArchive;

/// Where raw feed documents come from. Implementations return the document
/// untouched so it can be archived before it is parsed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_field(&self, feed_tournament_id: i64) -> Result<Value>;

    async fn fetch_results(&self, feed_tournament_id: i64) -> Result<Value>;

    fn name(&self) -> &'static str;
}

#[derive(Clone)]
pub struct SyncContext {
    pub store: Arc<dyn RosterStore>,
    pub feed: Arc<dyn FeedSource>,
    pub archive: Arc<dyn FeedArchive>,
}
