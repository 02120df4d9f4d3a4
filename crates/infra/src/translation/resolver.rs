use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use pricebatch_core::ItemId;

use super::provider::{TranslationError, TranslationProvider};

/// A translation group as seen by the batch core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalItem {
    /// Default-language record.
    pub canonical: ItemId,
    /// Every physical record of the group, canonical first, no duplicates.
    pub members: Vec<ItemId>,
}

/// Resolves canonical ids and translation groups.
///
/// Fails open: without a provider, with an inactive provider, or when the
/// provider errors, every id is its own canonical id and its own group.
#[derive(Clone, Default)]
pub struct TranslationResolver {
    provider: Option<Arc<dyn TranslationProvider>>,
}

impl core::fmt::Debug for TranslationResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TranslationResolver")
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

impl TranslationResolver {
    pub fn new(provider: Option<Arc<dyn TranslationProvider>>) -> Self {
        Self { provider }
    }

    /// Resolver for catalogs without multilingual support.
    pub fn disabled() -> Self {
        Self { provider: None }
    }

    pub fn with_provider(provider: Arc<dyn TranslationProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    fn active_provider(&self) -> Option<&dyn TranslationProvider> {
        self.provider.as_deref().filter(|p| p.is_active())
    }

    pub fn is_active(&self) -> bool {
        self.active_provider().is_some()
    }

    /// Default-language id of the group containing `id`, or `id` itself.
    pub fn canonical_id(&self, id: ItemId) -> ItemId {
        let Some(provider) = self.active_provider() else {
            return id;
        };

        let lookup = provider
            .default_language()
            .and_then(|lang| provider.canonical_id(id, &lang));

        match lookup {
            Ok(Some(canonical)) => canonical,
            Ok(None) => id,
            Err(e) => {
                warn!(item_id = %id, error = %e, "canonical id lookup failed; using id as is");
                id
            }
        }
    }

    /// Every physical id of the group containing `id`.
    ///
    /// Always contains `id` and its canonical id; `[id]` when no group exists.
    pub fn group_members(&self, id: ItemId) -> Vec<ItemId> {
        self.logical_item(id).members
    }

    /// Canonical id plus members of the group containing `id`.
    pub fn logical_item(&self, id: ItemId) -> LogicalItem {
        let canonical = self.canonical_id(id);
        let Some(provider) = self.active_provider() else {
            return LogicalItem {
                canonical,
                members: vec![id],
            };
        };

        match Self::lookup_members(provider, canonical) {
            Ok(Some(found)) => {
                let mut members = Vec::with_capacity(found.len() + 2);
                for member in [canonical].into_iter().chain(found).chain([id]) {
                    if !members.contains(&member) {
                        members.push(member);
                    }
                }
                LogicalItem { canonical, members }
            }
            Ok(None) => LogicalItem {
                canonical,
                members: vec![id],
            },
            Err(e) => {
                warn!(item_id = %id, error = %e, "translation group lookup failed; processing id alone");
                LogicalItem {
                    canonical,
                    members: vec![id],
                }
            }
        }
    }

    fn lookup_members(
        provider: &dyn TranslationProvider,
        canonical: ItemId,
    ) -> Result<Option<Vec<ItemId>>, TranslationError> {
        let Some(group) = provider.translation_group_id(canonical)? else {
            return Ok(None);
        };
        Ok(Some(provider.members_of(group)?))
    }

    /// Map ids to canonical ids and drop duplicates, keeping first-seen order.
    pub fn dedup_canonical(&self, ids: &[ItemId]) -> Vec<ItemId> {
        let mut seen = HashSet::with_capacity(ids.len());
        ids.iter()
            .map(|id| self.canonical_id(*id))
            .filter(|canonical| seen.insert(*canonical))
            .collect()
    }

    /// Notice for operators listing the languages a change will reach.
    pub fn status_message(&self) -> Option<String> {
        let provider = self.active_provider()?;
        match provider.active_languages() {
            Ok(languages) => {
                let codes: Vec<&str> = languages.iter().map(|l| l.as_str()).collect();
                Some(format!(
                    "Multilingual support is active. Discounts apply to all language versions: {}",
                    codes.join(", ")
                ))
            }
            Err(e) => {
                warn!(error = %e, "could not list active languages");
                None
            }
        }
    }
}
