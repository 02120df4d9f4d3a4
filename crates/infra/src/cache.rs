//! Edge-cache invalidation after catalog changes.
//!
//! Purging is a best-effort side effect: failures are logged and dropped, and
//! [`purge_all`] cannot fail the caller's flow.

use std::sync::Arc;
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache purge failed: {0}")]
    PurgeFailed(String),
}

/// Capability interface of one edge-cache integration.
pub trait CacheInvalidator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn purge_all(&self) -> Result<(), CacheError>;
}

/// Purge every configured cache, logging and discarding failures.
///
/// Returns how many invalidators succeeded.
pub fn purge_all(invalidators: &[Arc<dyn CacheInvalidator>]) -> usize {
    let mut purged = 0;
    for invalidator in invalidators {
        match invalidator.purge_all() {
            Ok(()) => {
                debug!(cache = invalidator.name(), "cache purged");
                purged += 1;
            }
            Err(e) => warn!(cache = invalidator.name(), error = %e, "cache purge failed"),
        }
    }
    purged
}

/// Invalidator that records purge calls; for tests/dev.
#[derive(Debug, Default)]
pub struct RecordingInvalidator {
    name: String,
    fail_with: Option<String>,
    calls: Mutex<usize>,
}

impl RecordingInvalidator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fail_with: None,
            calls: Mutex::new(0),
        }
    }

    /// Invalidator whose every purge fails with `message`.
    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::new(name)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().map(|c| *c).unwrap_or_default()
    }
}

impl CacheInvalidator for RecordingInvalidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn purge_all(&self) -> Result<(), CacheError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
        match &self.fail_with {
            Some(message) => Err(CacheError::PurgeFailed(message.clone())),
            None => Ok(()),
        }
    }
}
