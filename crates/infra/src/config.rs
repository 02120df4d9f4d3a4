//! Configuration loading and representation.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Default number of logical items per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 50;
/// Default pause between chunks.
pub const DEFAULT_CHUNK_PAUSE: Duration = Duration::from_millis(100);
/// Selections larger than this are worth a progress notice.
pub const DEFAULT_BATCHING_THRESHOLD: usize = 100;
/// Rough store throughput used for duration estimates.
pub const DEFAULT_ITEMS_PER_SECOND: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Batch runner configuration.
///
/// Constructed explicitly and passed to the runner; there is no process-wide
/// instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchConfig {
    /// Logical items per chunk (at least 1).
    pub chunk_size: usize,
    /// Pause between chunks; zero disables it.
    pub chunk_pause: Duration,
    /// Apply changes to every language variant of an item.
    pub fan_out_translations: bool,
    /// Purge edge caches once a run finishes.
    pub purge_cache_after_run: bool,
    pub batching_threshold: usize,
    pub items_per_second: u32,
    /// Name for logging and worker threads.
    pub name: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_pause: DEFAULT_CHUNK_PAUSE,
            fan_out_translations: true,
            purge_cache_after_run: true,
            batching_threshold: DEFAULT_BATCHING_THRESHOLD,
            items_per_second: DEFAULT_ITEMS_PER_SECOND,
            name: "discount-batch".to_string(),
        }
    }
}

impl BatchConfig {
    pub const ENV_CHUNK_SIZE: &'static str = "PRICEBATCH_CHUNK_SIZE";
    pub const ENV_CHUNK_PAUSE_MS: &'static str = "PRICEBATCH_CHUNK_PAUSE_MS";
    pub const ENV_FAN_OUT: &'static str = "PRICEBATCH_FAN_OUT";
    pub const ENV_PURGE_CACHE: &'static str = "PRICEBATCH_PURGE_CACHE";
    pub const ENV_BATCHING_THRESHOLD: &'static str = "PRICEBATCH_BATCHING_THRESHOLD";
    pub const ENV_ITEMS_PER_SECOND: &'static str = "PRICEBATCH_ITEMS_PER_SECOND";

    /// Load from process environment; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup(Self::ENV_CHUNK_SIZE) {
            config = config.with_chunk_size(parse_number(Self::ENV_CHUNK_SIZE, &v)?);
        }
        if let Some(v) = lookup(Self::ENV_CHUNK_PAUSE_MS) {
            let millis: u64 = parse_number(Self::ENV_CHUNK_PAUSE_MS, &v)?;
            config.chunk_pause = Duration::from_millis(millis);
        }
        if let Some(v) = lookup(Self::ENV_FAN_OUT) {
            config.fan_out_translations = parse_flag(Self::ENV_FAN_OUT, &v)?;
        }
        if let Some(v) = lookup(Self::ENV_PURGE_CACHE) {
            config.purge_cache_after_run = parse_flag(Self::ENV_PURGE_CACHE, &v)?;
        }
        if let Some(v) = lookup(Self::ENV_BATCHING_THRESHOLD) {
            config.batching_threshold = parse_number(Self::ENV_BATCHING_THRESHOLD, &v)?;
        }
        if let Some(v) = lookup(Self::ENV_ITEMS_PER_SECOND) {
            let rate: u32 = parse_number(Self::ENV_ITEMS_PER_SECOND, &v)?;
            if rate == 0 {
                return Err(ConfigError::Invalid {
                    key: Self::ENV_ITEMS_PER_SECOND,
                    value: v,
                    reason: "must be positive".to_string(),
                });
            }
            config.items_per_second = rate;
        }

        Ok(config)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Zero is raised to 1.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    pub fn with_chunk_pause(mut self, pause: Duration) -> Self {
        self.chunk_pause = pause;
        self
    }

    pub fn with_fan_out(mut self, enabled: bool) -> Self {
        self.fan_out_translations = enabled;
        self
    }

    pub fn with_cache_purge(mut self, enabled: bool) -> Self {
        self.purge_cache_after_run = enabled;
        self
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
