//! Multilingual translation groups.
//!
//! One logical product may exist as several physical records, one per
//! language. The platform that owns those groups is reached through
//! [`TranslationProvider`]; [`TranslationResolver`] is the only place the batch
//! core asks it questions.

pub mod in_memory;
pub mod provider;
pub mod resolver;

pub use in_memory::InMemoryTranslationProvider;
pub use provider::{LanguageCode, TranslationError, TranslationProvider};
pub use resolver::{LogicalItem, TranslationResolver};
