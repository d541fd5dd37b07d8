// Runtime configuration, read from the environment (and `.env` via dotenv).

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::core::moderation::ImageSizeLimit;

const DEFAULT_DATA_PATH: &str = "data/storage.json";
const DEFAULT_MAX_IMAGE_SIZE_MB: u64 = 8;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub data_path: PathBuf,
    pub size_limit: ImageSizeLimit,
    pub fetch_timeout: Duration,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup, so tests don't touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                anyhow!("Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.")
            })?;

        let data_path = lookup("DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let max_image_size_mb = parse_u64(&lookup, "MAX_IMAGE_SIZE_MB", DEFAULT_MAX_IMAGE_SIZE_MB)?;
        let fetch_timeout_secs = parse_u64(
            &lookup,
            "ATTACHMENT_FETCH_TIMEOUT_SECS",
            DEFAULT_FETCH_TIMEOUT_SECS,
        )?;

        Ok(Self {
            discord_token,
            data_path,
            size_limit: ImageSizeLimit::from_megabytes(max_image_size_mb),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
        })
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number, got {raw:?}")),
        None => Ok(default),
    }
}
