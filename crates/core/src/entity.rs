//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// A catalog record keeps its identity while its price fields are rewritten, so
/// two records with equal prices are still distinct entities.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
