use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pricebatch_core::{ItemId, TranslationGroupId};

/// Language code as used by the multilingual platform (e.g. `"en"`, `"lt"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("translation platform unavailable: {0}")]
    Unavailable(String),

    #[error("translation lookup failed: {0}")]
    Lookup(String),
}

/// Capability interface of the multilingual content platform.
///
/// The batch core only reads groups; it never creates or edits them.
pub trait TranslationProvider: Send + Sync {
    /// Whether multilingual support is currently enabled.
    fn is_active(&self) -> bool;

    fn default_language(&self) -> Result<LanguageCode, TranslationError>;

    fn active_languages(&self) -> Result<Vec<LanguageCode>, TranslationError>;

    /// The variant of `id` in `language`, if the group has one.
    fn canonical_id(
        &self,
        id: ItemId,
        language: &LanguageCode,
    ) -> Result<Option<ItemId>, TranslationError>;

    fn translation_group_id(&self, id: ItemId) -> Result<Option<TranslationGroupId>, TranslationError>;

    fn members_of(&self, group: TranslationGroupId) -> Result<Vec<ItemId>, TranslationError>;
}

impl<P> TranslationProvider for Arc<P>
where
    P: TranslationProvider + ?Sized,
{
    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn default_language(&self) -> Result<LanguageCode, TranslationError> {
        (**self).default_language()
    }

    fn active_languages(&self) -> Result<Vec<LanguageCode>, TranslationError> {
        (**self).active_languages()
    }

    fn canonical_id(
        &self,
        id: ItemId,
        language: &LanguageCode,
    ) -> Result<Option<ItemId>, TranslationError> {
        (**self).canonical_id(id, language)
    }

    fn translation_group_id(&self, id: ItemId) -> Result<Option<TranslationGroupId>, TranslationError> {
        (**self).translation_group_id(id)
    }

    fn members_of(&self, group: TranslationGroupId) -> Result<Vec<ItemId>, TranslationError> {
        (**self).members_of(group)
    }
}
