//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. Discount
/// requests, sale windows and price mutations are values: two requests with the
/// same percent and dates describe the same change.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Percent(Decimal);
///
/// impl ValueObject for Percent {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
