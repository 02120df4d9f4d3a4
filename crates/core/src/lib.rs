//! `pricebatch-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the catalog logic and
//! the batch infrastructure (no IO, no storage, no logging).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{BatchId, CategoryId, ItemId, TranslationGroupId};
pub use value_object::ValueObject;
