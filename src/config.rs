use crate::api::ApiEndpoints;
use crate::listing::{FanOut, ScreenOptions, StalePolicy};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_API_URL: &str = "FLAT_SCOUT_API_URL";
pub const ENV_LISTING_TIMEOUT_MS: &str = "FLAT_SCOUT_LISTING_TIMEOUT_MS";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "FLAT_SCOUT_REQUEST_TIMEOUT_MS";
pub const ENV_STATUS_CONCURRENCY: &str = "FLAT_SCOUT_STATUS_CONCURRENCY";
pub const ENV_DISCARD_STALE: &str = "FLAT_SCOUT_DISCARD_STALE";
pub const ENV_SESSION_FILE: &str = "FLAT_SCOUT_SESSION_FILE";

/// Runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub endpoints: ApiEndpoints,
    /// Bound on the bulk listing fetch
    pub listing_timeout: Duration,
    /// Bound on every other API call
    pub request_timeout: Duration,
    pub screen: ScreenOptions,
    /// JSON file holding the stored session keys
    pub session_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: ApiEndpoints::default(),
            listing_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            screen: ScreenOptions::default(),
            session_file: PathBuf::from("session.json"),
        }
    }
}

impl Config {
    /// Load config from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load config from any variable lookup; unset variables keep defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config.endpoints = ApiEndpoints::with_base(url);
            config
                .endpoints
                .all_flats_url()
                .with_context(|| format!("{} is not a usable URL", ENV_API_URL))?;
        }
        if let Some(raw) = lookup(ENV_LISTING_TIMEOUT_MS) {
            config.listing_timeout = Duration::from_millis(parse_number(ENV_LISTING_TIMEOUT_MS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            config.request_timeout = Duration::from_millis(parse_number(ENV_REQUEST_TIMEOUT_MS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_STATUS_CONCURRENCY) {
            let limit = parse_number(ENV_STATUS_CONCURRENCY, &raw)?;
            config.screen.fan_out = FanOut::from_limit(limit as usize);
        }
        if let Some(raw) = lookup(ENV_DISCARD_STALE) {
            config.screen.stale_policy = if parse_bool(ENV_DISCARD_STALE, &raw)? {
                StalePolicy::Discard
            } else {
                StalePolicy::Apply
            };
        }
        if let Some(path) = lookup(ENV_SESSION_FILE) {
            config.session_file = PathBuf::from(path);
        }

        Ok(config)
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .with_context(|| format!("{} must be a non-negative integer, got {:?}", key, raw))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => anyhow::bail!("{} must be a boolean, got {:?}", key, raw),
    }
}
