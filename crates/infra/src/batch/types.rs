//! Batch inputs, results and errors.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use pricebatch_catalog::{DiscountRequest, SkipReason};
use pricebatch_core::{BatchId, DomainError, ItemId};

use crate::catalog_store::StoreError;

/// What a batch does to every selected record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    Apply(DiscountRequest),
    Clear,
}

impl BatchMode {
    pub fn name(&self) -> &'static str {
        match self {
            BatchMode::Apply(_) => "apply",
            BatchMode::Clear => "clear",
        }
    }
}

/// Failure of one physical record. Recorded, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("item {0} not found")]
    NotFound(ItemId),

    #[error("loading item {item_id} failed: {source}")]
    Lookup { item_id: ItemId, source: StoreError },

    #[error("pricing item {item_id} failed: {source}")]
    Pricing { item_id: ItemId, source: DomainError },

    #[error("saving item {item_id} failed: {source}")]
    MutationFailed { item_id: ItemId, source: StoreError },
}

impl ItemError {
    pub fn item_id(&self) -> ItemId {
        match self {
            ItemError::NotFound(id) => *id,
            ItemError::Lookup { item_id, .. }
            | ItemError::Pricing { item_id, .. }
            | ItemError::MutationFailed { item_id, .. } => *item_id,
        }
    }
}

/// Precondition failure: the whole call is rejected before any write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("invalid discount request: {0}")]
    InvalidRequest(#[from] DomainError),

    #[error("no items selected")]
    EmptySelection,

    #[error("failed to start batch worker: {0}")]
    Spawn(String),

    #[error("batch worker panicked")]
    WorkerPanicked,
}

/// Per-record error entry of a [`BatchResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    /// Physical record that failed.
    pub item_id: ItemId,
    /// Logical (input) id whose translation group contained the record.
    pub source_id: ItemId,
    pub message: String,
}

/// Record left untouched by policy. Counted as processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub item_id: ItemId,
    pub reason: SkipReason,
}

/// Aggregate outcome of one batch run.
///
/// - `requested`: length of the input id list
/// - `total`: logical items after canonical dedup, before fan-out
/// - `processed`: physical records mutated or skipped by policy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub batch_id: BatchId,
    pub mode: &'static str,
    pub requested: usize,
    pub total: usize,
    pub processed: usize,
    pub skipped: Vec<SkippedItem>,
    pub errors: Vec<ItemFailure>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchResult {
    /// Physical records actually written.
    pub fn mutated(&self) -> usize {
        self.processed - self.skipped.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.errors.is_empty() && !self.cancelled
    }

    /// One operator-facing line per failure.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| format!("Error processing item ID {}: {}", e.item_id, e.message))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Live progress of a running batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub chunks_total: usize,
    pub chunks_done: usize,
    pub logical_total: usize,
    pub logical_done: usize,
    pub processed: usize,
    pub failed: usize,
}

impl BatchProgress {
    pub fn is_finished(&self) -> bool {
        self.chunks_total > 0 && self.chunks_done == self.chunks_total
    }
}
