//! Chunked discount batches with translation fan-out.
//!
//! ## Flow
//!
//! ids → canonical dedup → fixed-size chunks → per id: translation group →
//! per physical record: apply/clear → aggregate [`BatchResult`]
//!
//! ## Guarantees
//!
//! - One failing record never aborts the batch; failures are collected in
//!   input order
//! - A physical record is written at most once per run
//! - Cancellation is observed between chunks only, and yields a partial result
//! - No batch-wide transaction: consistency is per record

pub mod advisory;
pub mod cancel;
pub mod runner;
pub mod types;

pub use advisory::{estimate_duration, should_use_batching};
pub use cancel::CancelToken;
pub use runner::{BatchRunHandle, BatchRunner, chunk_ids};
pub use types::{BatchError, BatchMode, BatchProgress, BatchResult, ItemError, ItemFailure, SkippedItem};
