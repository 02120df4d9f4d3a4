//! Batch runner: chunked, failure-isolated discount application.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use pricebatch_catalog::{DiscountApplier, DiscountClearer, DiscountOutcome, SkipReason};
use pricebatch_core::{BatchId, ItemId};

use super::cancel::CancelToken;
use super::types::{BatchError, BatchMode, BatchProgress, BatchResult, ItemError, ItemFailure, SkippedItem};
use crate::cache::{self, CacheInvalidator};
use crate::catalog_store::CatalogStore;
use crate::config::BatchConfig;
use crate::translation::TranslationResolver;

/// Split `ids` into consecutive chunks of at most `size` (min 1), preserving order.
pub fn chunk_ids(ids: &[ItemId], size: usize) -> impl Iterator<Item = &[ItemId]> {
    ids.chunks(size.max(1))
}

enum ItemOutcome {
    Mutated,
    Skipped(SkipReason),
}

/// Applies or clears discounts over arbitrarily long id lists.
///
/// Collaborators are injected at construction; absent optional collaborators
/// (translations, caches) are simply not configured.
pub struct BatchRunner<S: CatalogStore> {
    store: S,
    translations: TranslationResolver,
    caches: Vec<Arc<dyn CacheInvalidator>>,
    config: BatchConfig,
}

impl<S: CatalogStore> BatchRunner<S> {
    pub fn new(store: S, config: BatchConfig) -> Self {
        Self {
            store,
            translations: TranslationResolver::disabled(),
            caches: Vec::new(),
            config,
        }
    }

    pub fn with_translations(mut self, translations: TranslationResolver) -> Self {
        self.translations = translations;
        self
    }

    pub fn with_cache_invalidator(mut self, invalidator: Arc<dyn CacheInvalidator>) -> Self {
        self.caches.push(invalidator);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn translations(&self) -> &TranslationResolver {
        &self.translations
    }

    /// Run a batch to completion on the calling thread.
    pub fn run(&self, ids: &[ItemId], mode: &BatchMode) -> Result<BatchResult, BatchError> {
        self.run_with_cancel(ids, mode, &CancelToken::new())
    }

    /// Run a batch, stopping at the next chunk boundary once `cancel` fires.
    pub fn run_with_cancel(
        &self,
        ids: &[ItemId],
        mode: &BatchMode,
        cancel: &CancelToken,
    ) -> Result<BatchResult, BatchError> {
        Self::check_preconditions(ids, mode)?;
        let progress = Mutex::new(BatchProgress::default());
        Ok(self.execute(ids, mode, cancel, &progress))
    }

    fn check_preconditions(ids: &[ItemId], mode: &BatchMode) -> Result<(), BatchError> {
        if ids.is_empty() {
            return Err(BatchError::EmptySelection);
        }
        if let BatchMode::Apply(request) = mode {
            request.validate()?;
        }
        Ok(())
    }

    /// Logical ids to iterate: canonical ids when fanning out, exact ids otherwise.
    fn logical_ids(&self, ids: &[ItemId]) -> Vec<ItemId> {
        if self.config.fan_out_translations {
            return self.translations.dedup_canonical(ids);
        }
        let mut seen = HashSet::with_capacity(ids.len());
        ids.iter().copied().filter(|id| seen.insert(*id)).collect()
    }

    fn targets(&self, logical_id: ItemId) -> Vec<ItemId> {
        if self.config.fan_out_translations {
            self.translations.group_members(logical_id)
        } else {
            vec![logical_id]
        }
    }

    fn execute(
        &self,
        ids: &[ItemId],
        mode: &BatchMode,
        cancel: &CancelToken,
        progress: &Mutex<BatchProgress>,
    ) -> BatchResult {
        let batch_id = BatchId::new();
        let started_at = Utc::now();
        let logical = self.logical_ids(ids);
        let chunk_size = self.config.chunk_size.max(1);
        let chunks_total = logical.len().div_ceil(chunk_size);

        if let Ok(mut p) = progress.lock() {
            *p = BatchProgress {
                chunks_total,
                logical_total: logical.len(),
                ..BatchProgress::default()
            };
        }

        info!(
            batch = %self.config.name,
            batch_id = %batch_id,
            mode = mode.name(),
            requested = ids.len(),
            total = logical.len(),
            chunks = chunks_total,
            "batch started"
        );

        let mut processed = 0usize;
        let mut skipped = Vec::new();
        let mut errors = Vec::new();
        let mut touched: HashSet<ItemId> = HashSet::new();
        let mut cancelled = false;

        for (index, chunk) in chunk_ids(&logical, chunk_size).enumerate() {
            let stop = if index == 0 {
                cancel.is_cancelled()
            } else {
                cancel.wait_timeout(self.config.chunk_pause)
            };
            if stop {
                warn!(
                    batch_id = %batch_id,
                    chunks_done = index,
                    chunks = chunks_total,
                    processed,
                    "batch cancelled"
                );
                cancelled = true;
                break;
            }

            let chunk_started = Instant::now();

            for &logical_id in chunk {
                for target in self.targets(logical_id) {
                    if !touched.insert(target) {
                        debug!(batch_id = %batch_id, item_id = %target, "item already handled in this batch");
                        continue;
                    }

                    match self.process_item(target, mode) {
                        Ok(ItemOutcome::Mutated) => {
                            debug!(batch_id = %batch_id, item_id = %target, source_id = %logical_id, "item updated");
                            processed += 1;
                        }
                        Ok(ItemOutcome::Skipped(reason)) => {
                            debug!(batch_id = %batch_id, item_id = %target, reason = %reason, "item skipped");
                            processed += 1;
                            skipped.push(SkippedItem {
                                item_id: target,
                                reason,
                            });
                        }
                        Err(e) => {
                            warn!(batch_id = %batch_id, item_id = %target, source_id = %logical_id, error = %e, "item failed");
                            errors.push(ItemFailure {
                                item_id: e.item_id(),
                                source_id: logical_id,
                                message: e.to_string(),
                            });
                        }
                    }
                }

                if let Ok(mut p) = progress.lock() {
                    p.logical_done += 1;
                    p.processed = processed;
                    p.failed = errors.len();
                }
            }

            if let Ok(mut p) = progress.lock() {
                p.chunks_done = index + 1;
            }

            info!(
                batch_id = %batch_id,
                chunk = index + 1,
                chunks = chunks_total,
                processed,
                total = logical.len(),
                elapsed_ms = chunk_started.elapsed().as_millis() as u64,
                "chunk processed"
            );
        }

        if self.config.purge_cache_after_run {
            cache::purge_all(&self.caches);
        }

        let result = BatchResult {
            batch_id,
            mode: mode.name(),
            requested: ids.len(),
            total: logical.len(),
            processed,
            skipped,
            errors,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            batch_id = %batch_id,
            processed = result.processed,
            skipped = result.skipped.len(),
            failed = result.errors.len(),
            cancelled,
            "batch finished"
        );

        result
    }

    fn process_item(&self, id: ItemId, mode: &BatchMode) -> Result<ItemOutcome, ItemError> {
        let item = self
            .store
            .find_by_id(id)
            .map_err(|source| ItemError::Lookup { item_id: id, source })?
            .ok_or(ItemError::NotFound(id))?;

        let mutation = match mode {
            BatchMode::Apply(request) => match DiscountApplier::apply(&item, request)
                .map_err(|source| ItemError::Pricing { item_id: id, source })?
            {
                DiscountOutcome::Mutate(mutation) => mutation,
                DiscountOutcome::Skip(reason) => return Ok(ItemOutcome::Skipped(reason)),
            },
            BatchMode::Clear => DiscountClearer::clear(&item),
        };

        self.store
            .save(id, &mutation)
            .map_err(|source| ItemError::MutationFailed { item_id: id, source })?;

        Ok(ItemOutcome::Mutated)
    }
}

impl<S: CatalogStore + 'static> BatchRunner<S> {
    /// Run a batch on a background thread.
    ///
    /// Preconditions are checked before the thread starts.
    pub fn spawn(self: Arc<Self>, ids: Vec<ItemId>, mode: BatchMode) -> Result<BatchRunHandle, BatchError> {
        Self::check_preconditions(&ids, &mode)?;

        let cancel = CancelToken::new();
        let progress = Arc::new(Mutex::new(BatchProgress::default()));

        let worker_cancel = cancel.clone();
        let worker_progress = progress.clone();
        let join = thread::Builder::new()
            .name(self.config.name.clone())
            .spawn(move || self.execute(&ids, &mode, &worker_cancel, &worker_progress))
            .map_err(|e| BatchError::Spawn(e.to_string()))?;

        Ok(BatchRunHandle {
            cancel,
            progress,
            join,
        })
    }
}

/// Handle to a batch running on a background thread.
#[derive(Debug)]
pub struct BatchRunHandle {
    cancel: CancelToken,
    progress: Arc<Mutex<BatchProgress>>,
    join: thread::JoinHandle<BatchResult>,
}

impl BatchRunHandle {
    /// Ask the batch to stop at the next chunk boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn progress(&self) -> BatchProgress {
        self.progress.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the batch and return its (possibly partial) result.
    pub fn join(self) -> Result<BatchResult, BatchError> {
        self.join.join().map_err(|_| BatchError::WorkerPanicked)
    }
}
