use std::sync::Arc;

use thiserror::Error;

use pricebatch_catalog::{CatalogItem, PriceMutation, ProductTag};
use pricebatch_core::{CategoryId, ItemId};

/// Catalog store error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("catalog item not found: {0}")]
    NotFound(ItemId),

    /// The store refused the write (validation hook, read-only record, ...).
    #[error("write rejected: {0}")]
    Rejected(String),

    #[error("concurrent modification of item {0}")]
    Conflict(ItemId),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Catalog storage abstraction consumed by the batch core.
///
/// `save` must apply a [`PriceMutation`] atomically: on `Err` none of its field
/// changes may be visible.
pub trait CatalogStore: Send + Sync {
    /// Load one physical record.
    fn find_by_id(&self, id: ItemId) -> Result<Option<CatalogItem>, StoreError>;

    /// Resolve a SKU to a record id.
    fn find_id_by_sku(&self, sku: &str) -> Result<Option<ItemId>, StoreError>;

    /// Ids of records in a category, optionally including its descendants.
    fn find_ids_by_category(
        &self,
        category: CategoryId,
        include_descendants: bool,
    ) -> Result<Vec<ItemId>, StoreError>;

    /// Ids of records that currently carry a sale price, zero included.
    fn find_discounted_ids(&self) -> Result<Vec<ItemId>, StoreError>;

    /// Persist a mutation for one record.
    fn save(&self, id: ItemId, mutation: &PriceMutation) -> Result<(), StoreError>;

    /// Attach `tag` to a record, keeping its existing tags.
    fn add_tag(&self, id: ItemId, tag: &ProductTag) -> Result<(), StoreError>;
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn find_by_id(&self, id: ItemId) -> Result<Option<CatalogItem>, StoreError> {
        (**self).find_by_id(id)
    }

    fn find_id_by_sku(&self, sku: &str) -> Result<Option<ItemId>, StoreError> {
        (**self).find_id_by_sku(sku)
    }

    fn find_ids_by_category(
        &self,
        category: CategoryId,
        include_descendants: bool,
    ) -> Result<Vec<ItemId>, StoreError> {
        (**self).find_ids_by_category(category, include_descendants)
    }

    fn find_discounted_ids(&self) -> Result<Vec<ItemId>, StoreError> {
        (**self).find_discounted_ids()
    }

    fn save(&self, id: ItemId, mutation: &PriceMutation) -> Result<(), StoreError> {
        (**self).save(id, mutation)
    }

    fn add_tag(&self, id: ItemId, tag: &ProductTag) -> Result<(), StoreError> {
        (**self).add_tag(id, tag)
    }
}
