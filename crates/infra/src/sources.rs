//! Selection of the ids a batch runs over.
//!
//! Thin wrappers over [`CatalogStore`] queries used by the entry points
//! (SKU list upload, category pick, "clear everything", discount listing).

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use pricebatch_core::{CategoryId, ItemId};

use crate::catalog_store::{CatalogStore, StoreError};

/// Outcome of resolving a list of SKUs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkuResolution {
    /// Resolved ids in input order. May contain duplicates if SKUs repeat.
    pub ids: Vec<ItemId>,
    /// SKUs with no matching record, trimmed.
    pub unknown_skus: Vec<String>,
}

impl SkuResolution {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Resolve SKUs to record ids.
///
/// Blank entries are ignored. A failed lookup is reported as unknown rather
/// than failing the whole selection.
pub fn resolve_skus<S, I>(store: &S, skus: I) -> SkuResolution
where
    S: CatalogStore + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut resolution = SkuResolution::default();

    for raw in skus {
        let sku = raw.as_ref().trim();
        if sku.is_empty() {
            continue;
        }

        match store.find_id_by_sku(sku) {
            Ok(Some(id)) => resolution.ids.push(id),
            Ok(None) => resolution.unknown_skus.push(sku.to_string()),
            Err(e) => {
                warn!(sku, error = %e, "sku lookup failed");
                resolution.unknown_skus.push(sku.to_string());
            }
        }
    }

    debug!(
        resolved = resolution.ids.len(),
        unknown = resolution.unknown_skus.len(),
        "skus resolved"
    );
    resolution
}

/// Ids of every record in `category`, optionally with its subcategories.
pub fn ids_in_category<S>(
    store: &S,
    category: CategoryId,
    include_descendants: bool,
) -> Result<Vec<ItemId>, StoreError>
where
    S: CatalogStore + ?Sized,
{
    store.find_ids_by_category(category, include_descendants)
}

/// Category restriction for a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryFilter {
    pub category: CategoryId,
    pub include_descendants: bool,
}

impl CategoryFilter {
    /// `category` and all of its subcategories.
    pub fn with_descendants(category: CategoryId) -> Self {
        Self {
            category,
            include_descendants: true,
        }
    }
}

/// Ids of every record currently carrying a sale price, optionally limited to
/// one category.
pub fn discounted_ids<S>(store: &S, filter: Option<CategoryFilter>) -> Result<Vec<ItemId>, StoreError>
where
    S: CatalogStore + ?Sized,
{
    let discounted = store.find_discounted_ids()?;
    let Some(filter) = filter else {
        return Ok(discounted);
    };

    let in_category: HashSet<ItemId> = store
        .find_ids_by_category(filter.category, filter.include_descendants)?
        .into_iter()
        .collect();
    Ok(discounted.into_iter().filter(|id| in_category.contains(id)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::InMemoryCatalogStore;
    use pricebatch_catalog::CatalogItem;
    use rust_decimal_macros::dec;

    fn store() -> InMemoryCatalogStore {
        let store = InMemoryCatalogStore::new();
        store.add_category(CategoryId::new(1), None);
        store.add_category(CategoryId::new(2), Some(CategoryId::new(1)));
        store.insert(CatalogItem::new(ItemId::new(10), dec!(20)), Some("SKU-10"), &[CategoryId::new(1)]);
        store.insert(
            CatalogItem::new(ItemId::new(11), dec!(30)).with_sale_price(dec!(25)),
            Some("SKU-11"),
            &[CategoryId::new(2)],
        );
        store
    }

    #[test]
    fn skus_are_trimmed_and_blanks_ignored() {
        let resolution = resolve_skus(&store(), [" SKU-11 ", "", "  ", "SKU-10", "NOPE"]);

        assert_eq!(resolution.ids, vec![ItemId::new(11), ItemId::new(10)]);
        assert_eq!(resolution.unknown_skus, vec!["NOPE".to_string()]);
    }

    #[test]
    fn no_known_skus_is_empty() {
        let resolution = resolve_skus(&store(), vec!["X".to_string()]);
        assert!(resolution.is_empty());
        assert_eq!(resolution.unknown_skus.len(), 1);
    }

    #[test]
    fn category_selection_can_include_descendants() {
        let store = store();
        assert_eq!(ids_in_category(&store, CategoryId::new(1), false).unwrap(), vec![ItemId::new(10)]);
        assert_eq!(
            ids_in_category(&store, CategoryId::new(1), true).unwrap(),
            vec![ItemId::new(10), ItemId::new(11)]
        );
    }

    #[test]
    fn discounted_selection_lists_sale_items() {
        assert_eq!(discounted_ids(&store(), None).unwrap(), vec![ItemId::new(11)]);
    }

    #[test]
    fn discounted_selection_can_be_limited_to_a_category() {
        let store = store();
        store.insert(
            CatalogItem::new(ItemId::new(12), dec!(30)).with_sale_price(dec!(20)),
            None,
            &[CategoryId::new(3)],
        );

        let under_root = CategoryFilter::with_descendants(CategoryId::new(1));
        assert_eq!(discounted_ids(&store, Some(under_root)).unwrap(), vec![ItemId::new(11)]);

        let root_only = CategoryFilter {
            category: CategoryId::new(1),
            include_descendants: false,
        };
        assert!(discounted_ids(&store, Some(root_only)).unwrap().is_empty());
        assert_eq!(discounted_ids(&store, None).unwrap(), vec![ItemId::new(11), ItemId::new(12)]);
    }
}
