use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use pricebatch_core::{ItemId, TranslationGroupId};

use super::provider::{LanguageCode, TranslationError, TranslationProvider};

/// In-memory translation platform for tests/dev.
#[derive(Debug)]
pub struct InMemoryTranslationProvider {
    active: AtomicBool,
    failing: AtomicBool,
    default_language: LanguageCode,
    languages: Vec<LanguageCode>,
    groups: RwLock<HashMap<TranslationGroupId, Vec<(ItemId, LanguageCode)>>>,
}

impl InMemoryTranslationProvider {
    /// Active provider with `default_language` first in `languages`.
    pub fn new(default_language: &str, languages: &[&str]) -> Self {
        let mut all = vec![LanguageCode::new(default_language)];
        all.extend(
            languages
                .iter()
                .filter(|l| **l != default_language)
                .map(|l| LanguageCode::new(*l)),
        );

        Self {
            active: AtomicBool::new(true),
            failing: AtomicBool::new(false),
            default_language: LanguageCode::new(default_language),
            languages: all,
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Register a translation group. Members are `(record, language)` pairs.
    pub fn add_group(&self, group: TranslationGroupId, members: &[(ItemId, &str)]) {
        if let Ok(mut groups) = self.groups.write() {
            groups.insert(
                group,
                members
                    .iter()
                    .map(|(id, lang)| (*id, LanguageCode::new(*lang)))
                    .collect(),
            );
        }
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    /// Make every lookup return [`TranslationError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), TranslationError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TranslationError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }

    fn group_of(&self, id: ItemId) -> Result<Option<(TranslationGroupId, Vec<(ItemId, LanguageCode)>)>, TranslationError> {
        let groups = self
            .groups
            .read()
            .map_err(|_| TranslationError::Lookup("translation groups lock poisoned".to_string()))?;
        Ok(groups
            .iter()
            .find(|(_, members)| members.iter().any(|(m, _)| *m == id))
            .map(|(g, members)| (*g, members.clone())))
    }
}

impl TranslationProvider for InMemoryTranslationProvider {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn default_language(&self) -> Result<LanguageCode, TranslationError> {
        self.check()?;
        Ok(self.default_language.clone())
    }

    fn active_languages(&self) -> Result<Vec<LanguageCode>, TranslationError> {
        self.check()?;
        Ok(self.languages.clone())
    }

    fn canonical_id(
        &self,
        id: ItemId,
        language: &LanguageCode,
    ) -> Result<Option<ItemId>, TranslationError> {
        self.check()?;
        Ok(self.group_of(id)?.and_then(|(_, members)| {
            members
                .into_iter()
                .find(|(_, lang)| lang == language)
                .map(|(member, _)| member)
        }))
    }

    fn translation_group_id(&self, id: ItemId) -> Result<Option<TranslationGroupId>, TranslationError> {
        self.check()?;
        Ok(self.group_of(id)?.map(|(group, _)| group))
    }

    fn members_of(&self, group: TranslationGroupId) -> Result<Vec<ItemId>, TranslationError> {
        self.check()?;
        let groups = self
            .groups
            .read()
            .map_err(|_| TranslationError::Lookup("translation groups lock poisoned".to_string()))?;
        Ok(groups
            .get(&group)
            .map(|members| members.iter().map(|(id, _)| *id).collect())
            .unwrap_or_default())
    }
}
