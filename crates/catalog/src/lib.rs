//! Catalog pricing module.
//!
//! This crate contains the per-item discount rules for catalog records,
//! implemented purely as deterministic domain logic (no IO, no storage). Each
//! operation inspects one record and returns the mutation a store should apply.

pub mod discount;
pub mod item;
pub mod tag;

pub use discount::{DiscountApplier, DiscountClearer, DiscountOutcome, DiscountRequest, SkipReason};
pub use item::{CatalogItem, FieldChange, PriceMutation, SaleWindow};
pub use tag::ProductTag;
