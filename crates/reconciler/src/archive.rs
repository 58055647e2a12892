//! Write-once archive of raw feed documents.
//!
//! Archives exist for audit. Nothing in the sync path reads them back.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::Result;

pub const DATA_SOURCE: &str = "sportcontent_api";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCollection {
    TournamentFields,
    TournamentResults,
}

impl FeedCollection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TournamentFields => "tournament_fields",
            Self::TournamentResults => "tournament_results",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArchivedFeed<'a> {
    pub feed_tournament_id: i64,
    pub archived_at: DateTime<Utc>,
    pub data_source: &'static str,
    pub payload: &'a Value,
}

#[async_trait]
pub trait FeedArchive: Send + Sync {
    /// Stores `payload` under a new key and returns that key. Existing keys are
    /// never overwritten.
    async fn archive(
        &self,
        collection: FeedCollection,
        feed_tournament_id: i64,
        payload: &Value,
    ) -> Result<String>;
}

/// Archive laid out as `{root}/{collection}/{feed_tournament_id}/{timestamp}.json`.
#[derive(Debug, Clone)]
pub struct FsFeedArchive {
    root: PathBuf,
}

impl FsFeedArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn relative_path(
        collection: FeedCollection,
        feed_tournament_id: i64,
        archived_at: DateTime<Utc>,
    ) -> PathBuf {
        let stamp = archived_at.format("%Y%m%dT%H%M%S%.6fZ").to_string();
        PathBuf::from(collection.as_str())
            .join(feed_tournament_id.to_string())
            .join(format!("{stamp}.json"))
    }

    async fn write_at(
        &self,
        collection: FeedCollection,
        feed_tournament_id: i64,
        payload: &Value,
        archived_at: DateTime<Utc>,
    ) -> Result<String> {
        let relative = Self::relative_path(collection, feed_tournament_id, archived_at);
        let path = self.root.join(&relative);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let document = ArchivedFeed {
            feed_tournament_id,
            archived_at,
            data_source: DATA_SOURCE,
            payload,
        };
        let bytes = serde_json::to_vec_pretty(&document)?;

        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&path)
            .await?;
        file.write_all(&bytes).await?;
        file.flush().await?;

        info!("Archived {} feed to {}", collection.as_str(), path.display());
        Ok(relative.to_string_lossy().into_owned())
    }
}

#[async_trait]
impl FeedArchive for FsFeedArchive {
    async fn archive(
        &self,
        collection: FeedCollection,
        feed_tournament_id: i64,
        payload: &Value,
    ) -> Result<String> {
        self.write_at(collection, feed_tournament_id, payload, Utc::now())
            .await
    }
}
