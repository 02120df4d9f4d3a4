//! Bulk product-tag assignment.
//!
//! Attaches one tag to every selected record (from [`crate::sources`]), keeping
//! existing tags. Records are tagged as given: no translation fan-out, no
//! chunking. Failures are per record, like discount batches.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, warn};

use pricebatch_catalog::ProductTag;
use pricebatch_core::ItemId;

use crate::batch::{BatchError, ItemFailure};
use crate::catalog_store::CatalogStore;

/// Outcome of one tag assignment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagAssignment {
    pub tag: ProductTag,
    /// Distinct ids attempted.
    pub total: usize,
    pub tagged: Vec<ItemId>,
    pub errors: Vec<ItemFailure>,
}

/// Attach `tag` to every id, each distinct id once, in input order.
///
/// An empty id list is rejected before any write.
pub fn assign_tag<S>(store: &S, ids: &[ItemId], tag: &ProductTag) -> Result<TagAssignment, BatchError>
where
    S: CatalogStore + ?Sized,
{
    if ids.is_empty() {
        return Err(BatchError::EmptySelection);
    }

    let mut seen = HashSet::with_capacity(ids.len());
    let mut result = TagAssignment {
        tag: tag.clone(),
        total: 0,
        tagged: Vec::new(),
        errors: Vec::new(),
    };

    for &id in ids.iter().filter(|id| seen.insert(**id)) {
        result.total += 1;
        match store.add_tag(id, tag) {
            Ok(()) => result.tagged.push(id),
            Err(e) => {
                warn!(item_id = %id, tag = %tag, error = %e, "tag assignment failed");
                result.errors.push(ItemFailure {
                    item_id: id,
                    source_id: id,
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        tag = %tag,
        total = result.total,
        tagged = result.tagged.len(),
        failed = result.errors.len(),
        "tag assigned"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::{InMemoryCatalogStore, StoreError};
    use pricebatch_catalog::CatalogItem;
    use rust_decimal_macros::dec;

    fn id(n: u64) -> ItemId {
        ItemId::new(n)
    }

    fn store_with(ids: &[u64]) -> InMemoryCatalogStore {
        let store = InMemoryCatalogStore::new();
        for n in ids {
            store.insert(CatalogItem::new(id(*n), dec!(10)), None, &[]);
        }
        store
    }

    #[test]
    fn tags_each_distinct_record_once() {
        let store = store_with(&[1, 2]);
        let tag = ProductTag::parse("autumn").unwrap();

        let result = assign_tag(&store, &[id(2), id(1), id(2)], &tag).unwrap();

        assert_eq!(result.total, 2);
        assert_eq!(result.tagged, vec![id(2), id(1)]);
        assert!(result.errors.is_empty());
        assert_eq!(store.tags(id(1)), vec![tag]);
    }

    #[test]
    fn failures_do_not_stop_other_records() {
        let store = store_with(&[1, 3]);
        store.fail_saves_for(id(1), StoreError::Rejected("locked".to_string()));
        let tag = ProductTag::parse("autumn").unwrap();

        let result = assign_tag(&store, &[id(1), id(2), id(3)], &tag).unwrap();

        assert_eq!(result.tagged, vec![id(3)]);
        let failed: Vec<ItemId> = result.errors.iter().map(|e| e.item_id).collect();
        assert_eq!(failed, vec![id(1), id(2)]);
        assert_eq!(result.errors[1].message, "catalog item not found: 2");
    }

    #[test]
    fn empty_selection_is_rejected() {
        let store = store_with(&[]);
        let tag = ProductTag::parse("autumn").unwrap();
        assert_eq!(assign_tag(&store, &[], &tag).unwrap_err(), BatchError::EmptySelection);
    }
}
