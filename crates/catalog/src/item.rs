use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pricebatch_core::{Entity, ItemId, ValueObject};

/// Date range during which a sale price is meant to be shown.
///
/// Either end may be open. Dates are stored for the storefront to enforce; the
/// batch core never acts on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaleWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl SaleWindow {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// Both ends open: equivalent to having no window at all.
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

impl ValueObject for SaleWindow {}

/// Change to a single optional field of a catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldChange<T> {
    /// Leave the stored value untouched.
    #[default]
    Keep,
    /// Overwrite with a new value.
    Set(T),
    /// Remove the stored value.
    Unset,
}

impl<T: Clone> FieldChange<T> {
    /// Apply this change to a stored slot.
    pub fn apply_to(&self, slot: &mut Option<T>) {
        match self {
            FieldChange::Keep => {}
            FieldChange::Set(value) => *slot = Some(value.clone()),
            FieldChange::Unset => *slot = None,
        }
    }
}

/// Mutation of the discount-related fields of one catalog record.
///
/// A store must apply all three field changes or none of them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceMutation {
    pub discount_percent: FieldChange<Decimal>,
    pub sale_price: FieldChange<Decimal>,
    pub sale_window: FieldChange<SaleWindow>,
}

impl PriceMutation {
    /// Mutation removing every trace of a discount.
    pub fn clear_all() -> Self {
        Self {
            discount_percent: FieldChange::Unset,
            sale_price: FieldChange::Unset,
            sale_window: FieldChange::Unset,
        }
    }

}

impl ValueObject for PriceMutation {}

/// One physical (language-specific) catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    id: ItemId,
    regular_price: Decimal,
    sale_price: Option<Decimal>,
    sale_window: Option<SaleWindow>,
    discount_percent: Option<Decimal>,
}

impl CatalogItem {
    /// A record with a base price and no discount state.
    pub fn new(id: ItemId, regular_price: Decimal) -> Self {
        Self {
            id,
            regular_price,
            sale_price: None,
            sale_window: None,
            discount_percent: None,
        }
    }

    pub fn with_sale_price(mut self, sale_price: Decimal) -> Self {
        self.sale_price = Some(sale_price);
        self
    }

    pub fn with_sale_window(mut self, window: SaleWindow) -> Self {
        self.sale_window = Some(window);
        self
    }

    pub fn with_discount_percent(mut self, percent: Decimal) -> Self {
        self.discount_percent = Some(percent);
        self
    }

    pub fn regular_price(&self) -> Decimal {
        self.regular_price
    }

    pub fn sale_price(&self) -> Option<Decimal> {
        self.sale_price
    }

    pub fn sale_window(&self) -> Option<&SaleWindow> {
        self.sale_window.as_ref()
    }

    pub fn discount_percent(&self) -> Option<Decimal> {
        self.discount_percent
    }

    /// A sale price is stored at all, zero included.
    pub fn has_sale_price(&self) -> bool {
        self.sale_price.is_some()
    }

    /// A non-zero sale price is stored. A zero sale price counts as no discount
    /// for the skip policy.
    pub fn is_discounted(&self) -> bool {
        self.sale_price.is_some_and(|p| !p.is_zero())
    }

    /// No discount field is set.
    pub fn is_clear(&self) -> bool {
        self.sale_price.is_none() && self.sale_window.is_none() && self.discount_percent.is_none()
    }

    /// Evolve the record by one mutation.
    ///
    /// An unbounded window is stored as "no window".
    pub fn apply(&mut self, mutation: &PriceMutation) {
        mutation.discount_percent.apply_to(&mut self.discount_percent);
        mutation.sale_price.apply_to(&mut self.sale_price);
        mutation.sale_window.apply_to(&mut self.sale_window);

        if self.sale_window.is_some_and(|w| w.is_unbounded()) {
            self.sale_window = None;
        }
    }

    /// Checks that a stored sale price matches the stored percent annotation.
    ///
    /// Records without a percent, with a non-positive base price, or without a
    /// sale price (skipped) are trivially consistent.
    pub fn is_price_consistent(&self) -> bool {
        match (self.discount_percent, self.sale_price) {
            (Some(percent), Some(sale)) if self.regular_price > Decimal::ZERO => {
                crate::discount::discounted_price(self.regular_price, percent) == Some(sale)
            }
            _ => true,
        }
    }
}

impl Entity for CatalogItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
