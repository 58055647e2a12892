use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::FeedConfig;
use crate::error::Result;
use crate::traits::FeedSource;

/// RapidAPI-hosted SportContent golf leaderboard API.
pub struct SportContentClient {
    base_url: String,
    api_key: String,
    api_host: String,
    client: reqwest::Client,
}

impl SportContentClient {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_host: config.api_host.clone(),
            client: reqwest::Client::builder()
                .user_agent(concat!("golf-sync/", env!("CARGO_PKG_VERSION")))
                .build()?,
        })
    }

    async fn get_json(&self, path: &str, feed_tournament_id: i64) -> Result<Value> {
        let url = format!("{}/{}/{}", self.base_url, path, feed_tournament_id);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("x-rapidapi-key", self.api_key.as_str())
            .header("x-rapidapi-host", self.api_host.as_str())
            .send()
            .await?
            .error_for_status()?;
        let data = response.json::<Value>().await?;

        Ok(data)
    }
}

#[async_trait]
impl FeedSource for SportContentClient {
    async fn fetch_field(&self, feed_tournament_id: i64) -> Result<Value> {
        self.get_json("entry-list", feed_tournament_id).await
    }

    async fn fetch_results(&self, feed_tournament_id: i64) -> Result<Value> {
        self.get_json("leaderboard", feed_tournament_id).await
    }

    fn name(&self) -> &'static str {
        "SportContent"
    }
}
