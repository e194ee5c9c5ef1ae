use anyhow::Context as _;
use serde::Deserialize;
use serenity::model::id::ChannelId;
use std::time::Duration;

use crate::broadcast::coordinator::{BroadcastPolicy, DEFAULT_CHUNK_SIZE};
use crate::broadcast::rate_limiter::RateLimiter;
use crate::broadcast::recipient_filter::RecipientFilter;
use crate::broadcast::state::DEFAULT_FAILED_SAMPLE_LIMIT;

/// Default prefix marking command invocations (never broadcast)
fn default_command_prefix() -> String {
    "/".to_string()
}

/// Default per-channel cooldown between broadcasts in seconds
fn default_cooldown_secs() -> u64 {
    10
}

/// Default delay between chunks in milliseconds
fn default_pace_millis() -> u64 {
    1000
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_failed_sample_limit() -> usize {
    DEFAULT_FAILED_SAMPLE_LIMIT
}

fn default_true() -> bool {
    true
}

/// Parse a comma-separated list of channel IDs
fn parse_channel_ids(list: &str) -> Result<Vec<ChannelId>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| match id.parse::<u64>() {
            Ok(value) if value != 0 => Ok(ChannelId::new(value)),
            _ => Err(format!("invalid channel id '{}'", id)),
        })
        .collect()
}

/// Deserialize environment variable string into a list of channel IDs
fn deserialize_channel_ids<'de, D>(deserializer: D) -> Result<Vec<ChannelId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(list) => parse_channel_ids(&list).map_err(serde::de::Error::custom),
        None => Ok(Vec::new()),
    }
}

#[derive(Deserialize, Clone)]
pub struct Params {
    pub discord_token: String,

    // Broadcast channels (comma-separated IDs)
    #[serde(default, deserialize_with = "deserialize_channel_ids")]
    pub broadcast_channels: Vec<ChannelId>,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    // Recipient Policy
    #[serde(default = "default_true")]
    pub exclude_author: bool,
    #[serde(default)]
    pub refresh_members: bool,

    // Rate Limiting
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_pace_millis")]
    pub pace_millis: u64,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    // Reporting / Retry
    #[serde(default = "default_failed_sample_limit")]
    pub failed_sample_limit: usize,
    #[serde(default)]
    pub max_transient_retries: usize,
}

/// Mask sensitive strings by showing only first and last few characters
fn mask_token(s: &str) -> String {
    const VISIBLE_CHARS: usize = 4;

    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= VISIBLE_CHARS * 2 {
        // If string is too short, mask everything except first char
        return match chars.first() {
            Some(first) => format!("{}***", first),
            None => "<empty>".to_string(),
        };
    }

    let head: String = chars[..VISIBLE_CHARS].iter().collect();
    let tail: String = chars[chars.len() - VISIBLE_CHARS..].iter().collect();
    format!("{}***{}", head, tail)
}

impl std::fmt::Debug for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Params")
            .field("discord_token", &mask_token(&self.discord_token))
            .field("broadcast_channels", &self.broadcast_channels)
            .field("command_prefix", &self.command_prefix)
            .field("exclude_author", &self.exclude_author)
            .field("refresh_members", &self.refresh_members)
            .field("cooldown_secs", &self.cooldown_secs)
            .field("pace_millis", &self.pace_millis)
            .field("chunk_size", &self.chunk_size)
            .field("failed_sample_limit", &self.failed_sample_limit)
            .field("max_transient_retries", &self.max_transient_retries)
            .finish()
    }
}

impl Params {
    pub fn new() -> anyhow::Result<Params> {
        envy::from_env::<Params>().context("Failed to load configuration")
    }

    /// Cooldown and pacing policy
    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(
            Duration::from_secs(self.cooldown_secs),
            Duration::from_millis(self.pace_millis),
        )
    }

    /// Chunking, sampling, retry and recipient policy
    pub fn broadcast_policy(&self) -> BroadcastPolicy {
        BroadcastPolicy {
            chunk_size: self.chunk_size.max(1),
            failed_sample_limit: self.failed_sample_limit,
            max_transient_retries: self.max_transient_retries,
            filter: RecipientFilter::new(self.exclude_author),
        }
    }
}
