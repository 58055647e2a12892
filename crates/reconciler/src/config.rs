use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_API_HOST: &str = "golf-leaderboard-data.p.rapidapi.com";
pub const DEFAULT_BASE_URL: &str = "https://golf-leaderboard-data.p.rapidapi.com";
pub const DEFAULT_ARCHIVE_DIR: &str = "./archive";

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub api_key: String,
    pub api_host: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub feed: FeedConfig,
    pub archive_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| clean_value(&v)).filter(|v| !v.is_empty());

        Ok(Self {
            feed: FeedConfig {
                api_key: var("RAPIDAPI_KEY").context("Cannot load RAPIDAPI_KEY env variable")?,
                api_host: var("RAPIDAPI_HOST").unwrap_or_else(|| DEFAULT_API_HOST.to_string()),
                base_url: var("SPORTCONTENT_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            },
            archive_dir: var("FEED_ARCHIVE_DIR")
                .unwrap_or_else(|| DEFAULT_ARCHIVE_DIR.to_string())
                .into(),
        })
    }
}

/// Strips surrounding whitespace and one layer of matching quotes, as left
/// behind by some secret managers and hand-written `.env` files.
pub fn clean_value(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}
