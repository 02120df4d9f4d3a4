use serde::{Deserialize, Serialize};

use pricebatch_core::{DomainError, DomainResult, ValueObject};

/// Name of a product tag (storefront label such as "black-friday").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductTag(String);

impl ProductTag {
    /// Trimmed, non-blank tag name.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(DomainError::validation("tag name must not be blank"));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ProductTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueObject for ProductTag {}
