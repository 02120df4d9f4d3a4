use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, RwLock};

use pricebatch_catalog::{CatalogItem, PriceMutation, ProductTag};
use pricebatch_core::{CategoryId, Entity, ItemId};

use super::store::{CatalogStore, StoreError};

#[derive(Debug, Clone)]
struct StoredRecord {
    item: CatalogItem,
    sku: Option<String>,
    categories: Vec<CategoryId>,
    tags: Vec<ProductTag>,
}

/// In-memory catalog store.
///
/// Intended for tests/dev. Supports a category tree and injected save failures.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    records: RwLock<HashMap<ItemId, StoredRecord>>,
    /// category -> parent
    categories: RwLock<HashMap<CategoryId, Option<CategoryId>>>,
    failing: RwLock<HashMap<ItemId, StoreError>>,
    save_log: Mutex<Vec<ItemId>>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Storage("catalog store lock poisoned".to_string())
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub fn insert(&self, item: CatalogItem, sku: Option<&str>, categories: &[CategoryId]) {
        if let Ok(mut records) = self.records.write() {
            records.insert(
                *item.id(),
                StoredRecord {
                    item,
                    sku: sku.map(str::to_string),
                    categories: categories.to_vec(),
                    tags: Vec::new(),
                },
            );
        }
    }

    /// Register a category under an optional parent.
    pub fn add_category(&self, category: CategoryId, parent: Option<CategoryId>) {
        if let Ok(mut map) = self.categories.write() {
            map.insert(category, parent);
        }
    }

    /// Make every subsequent write (`save`, `add_tag`) for `id` fail with `error`.
    pub fn fail_saves_for(&self, id: ItemId, error: StoreError) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(id, error);
        }
    }

    /// Current state of a record.
    pub fn get(&self, id: ItemId) -> Option<CatalogItem> {
        let records = self.records.read().ok()?;
        records.get(&id).map(|r| r.item.clone())
    }

    /// Tags attached to a record, in attach order.
    pub fn tags(&self, id: ItemId) -> Vec<ProductTag> {
        self.records
            .read()
            .ok()
            .and_then(|records| records.get(&id).map(|r| r.tags.clone()))
            .unwrap_or_default()
    }

    fn check_writable(&self, id: ItemId) -> Result<(), StoreError> {
        match self.failing.read().map_err(poisoned)?.get(&id) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Ids passed to successful `save` calls, in call order.
    pub fn save_log(&self) -> Vec<ItemId> {
        self.save_log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    fn with_descendants(&self, root: CategoryId) -> Result<HashSet<CategoryId>, StoreError> {
        let parents = self.categories.read().map_err(poisoned)?;
        let mut found = HashSet::from([root]);
        let mut queue = VecDeque::from([root]);

        while let Some(current) = queue.pop_front() {
            for (child, parent) in parents.iter() {
                if *parent == Some(current) && found.insert(*child) {
                    queue.push_back(*child);
                }
            }
        }
        Ok(found)
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn find_by_id(&self, id: ItemId) -> Result<Option<CatalogItem>, StoreError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.get(&id).map(|r| r.item.clone()))
    }

    fn find_id_by_sku(&self, sku: &str) -> Result<Option<ItemId>, StoreError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records
            .iter()
            .filter(|(_, r)| r.sku.as_deref() == Some(sku))
            .map(|(id, _)| *id)
            .min())
    }

    fn find_ids_by_category(
        &self,
        category: CategoryId,
        include_descendants: bool,
    ) -> Result<Vec<ItemId>, StoreError> {
        let wanted = if include_descendants {
            self.with_descendants(category)?
        } else {
            HashSet::from([category])
        };

        let records = self.records.read().map_err(poisoned)?;
        let mut ids: Vec<ItemId> = records
            .iter()
            .filter(|(_, r)| r.categories.iter().any(|c| wanted.contains(c)))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn find_discounted_ids(&self) -> Result<Vec<ItemId>, StoreError> {
        let records = self.records.read().map_err(poisoned)?;
        let mut ids: Vec<ItemId> = records
            .iter()
            .filter(|(_, r)| r.item.has_sale_price())
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn save(&self, id: ItemId, mutation: &PriceMutation) -> Result<(), StoreError> {
        self.check_writable(id)?;

        let mut records = self.records.write().map_err(poisoned)?;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        record.item.apply(mutation);

        if let Ok(mut log) = self.save_log.lock() {
            log.push(id);
        }
        Ok(())
    }

    fn add_tag(&self, id: ItemId, tag: &ProductTag) -> Result<(), StoreError> {
        self.check_writable(id)?;

        let mut records = self.records.write().map_err(poisoned)?;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if !record.tags.contains(tag) {
            record.tags.push(tag.clone());
        }
        Ok(())
    }
}
