//! Per-item discount application and clearing.

use core::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pricebatch_core::{DomainError, DomainResult, ValueObject};

use crate::item::{CatalogItem, FieldChange, PriceMutation, SaleWindow};

/// Input format for sale window dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Flat percentage discount to apply to a set of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRequest {
    pub percent: Decimal,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Leave records that already carry a sale price untouched.
    pub skip_if_discounted: bool,
}

impl DiscountRequest {
    pub fn new(percent: Decimal) -> Self {
        Self {
            percent,
            start_date: None,
            end_date: None,
            skip_if_discounted: false,
        }
    }

    pub fn with_window(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn skipping_discounted(mut self) -> Self {
        self.skip_if_discounted = true;
        self
    }

    /// Build a request from raw form values.
    ///
    /// Blank dates mean an open window end. Date ordering is not checked.
    pub fn parse(percent: &str, start: &str, end: &str, skip_if_discounted: bool) -> DomainResult<Self> {
        let percent = Decimal::from_str(percent.trim())
            .map_err(|e| DomainError::validation(format!("discount percent {percent:?}: {e}")))?;

        let request = Self {
            percent,
            start_date: parse_date(start)?,
            end_date: parse_date(end)?,
            skip_if_discounted,
        };
        request.validate()?;
        Ok(request)
    }

    /// Precondition for a batch: `0 < percent <= 100`.
    pub fn validate(&self) -> DomainResult<()> {
        if self.percent <= Decimal::ZERO || self.percent > Decimal::ONE_HUNDRED {
            return Err(DomainError::validation(format!(
                "discount percent must be in (0, 100], got {}",
                self.percent
            )));
        }
        Ok(())
    }

    pub fn sale_window(&self) -> SaleWindow {
        SaleWindow::new(self.start_date, self.end_date)
    }
}

impl ValueObject for DiscountRequest {}

fn parse_date(raw: &str) -> DomainResult<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|e| DomainError::validation(format!("sale date {raw:?}: {e}")))
}

/// `regular - regular * percent / 100`, unrounded.
///
/// `None` when an intermediate value leaves the decimal range.
pub fn discounted_price(regular: Decimal, percent: Decimal) -> Option<Decimal> {
    regular
        .checked_mul(percent)?
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|off| regular.checked_sub(off))
}

/// Why a record was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// `skip_if_discounted` was set and the record already has a sale price.
    AlreadyDiscounted,
}

impl core::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SkipReason::AlreadyDiscounted => f.write_str("already discounted"),
        }
    }
}

/// Decision for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscountOutcome {
    Mutate(PriceMutation),
    Skip(SkipReason),
}

/// Computes the mutation that applies a discount to one record.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscountApplier;

impl DiscountApplier {
    /// Decide what to write for `item`.
    ///
    /// - already discounted (non-zero sale price) and `skip_if_discounted`:
    ///   skip, nothing written
    /// - non-positive base price: only the percent annotation is written
    /// - otherwise percent, sale price and window; the sale price is left as is
    ///   when it would equal the base price
    ///
    /// Out-of-range percents are applied as given; range checks happen once per
    /// batch in [`DiscountRequest::validate`]. Fails with
    /// [`DomainError::Overflow`] when the sale price cannot be represented.
    pub fn apply(item: &CatalogItem, request: &DiscountRequest) -> DomainResult<DiscountOutcome> {
        if request.skip_if_discounted && item.is_discounted() {
            return Ok(DiscountOutcome::Skip(SkipReason::AlreadyDiscounted));
        }

        let mut mutation = PriceMutation {
            discount_percent: FieldChange::Set(request.percent),
            ..PriceMutation::default()
        };

        let regular = item.regular_price();
        if regular <= Decimal::ZERO {
            return Ok(DiscountOutcome::Mutate(mutation));
        }

        let new_price = discounted_price(regular, request.percent).ok_or_else(|| {
            DomainError::overflow(format!("{}% off {regular}", request.percent))
        })?;
        if new_price != regular {
            mutation.sale_price = FieldChange::Set(new_price);
        }

        let window = request.sale_window();
        mutation.sale_window = if window.is_unbounded() {
            FieldChange::Unset
        } else {
            FieldChange::Set(window)
        };

        Ok(DiscountOutcome::Mutate(mutation))
    }
}

/// Computes the mutation that removes a discount from one record.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscountClearer;

impl DiscountClearer {
    /// Always unsets percent, sale price and window together. Clearing a clear
    /// record is a harmless no-op write.
    pub fn clear(_item: &CatalogItem) -> PriceMutation {
        PriceMutation::clear_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricebatch_core::ItemId;
    use rust_decimal_macros::dec;

    fn item(regular: Decimal) -> CatalogItem {
        CatalogItem::new(ItemId::new(1), regular)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn applied(mut item: CatalogItem, request: &DiscountRequest) -> CatalogItem {
        if let Ok(DiscountOutcome::Mutate(m)) = DiscountApplier::apply(&item, request) {
            item.apply(&m);
        }
        item
    }

    #[test]
    fn twenty_percent_off_one_hundred_is_eighty() {
        let outcome = DiscountApplier::apply(&item(dec!(100)), &DiscountRequest::new(dec!(20))).unwrap();
        match outcome {
            DiscountOutcome::Mutate(m) => {
                assert_eq!(m.sale_price, FieldChange::Set(dec!(80)));
                assert_eq!(m.discount_percent, FieldChange::Set(dec!(20)));
            }
            other => panic!("Expected mutation, got {other:?}"),
        }
    }

    #[test]
    fn zero_base_price_only_sets_percent() {
        let outcome = DiscountApplier::apply(&item(dec!(0)), &DiscountRequest::new(dec!(20))).unwrap();
        match outcome {
            DiscountOutcome::Mutate(m) => {
                assert_eq!(m.discount_percent, FieldChange::Set(dec!(20)));
                assert_eq!(m.sale_price, FieldChange::Keep);
                assert_eq!(m.sale_window, FieldChange::Keep);
            }
            other => panic!("Expected mutation, got {other:?}"),
        }
    }

    #[test]
    fn negative_base_price_only_sets_percent() {
        let after = applied(item(dec!(-5)), &DiscountRequest::new(dec!(10)));
        assert_eq!(after.discount_percent(), Some(dec!(10)));
        assert_eq!(after.sale_price(), None);
        assert_eq!(after.sale_window(), None);
    }

    #[test]
    fn skip_policy_leaves_discounted_item_untouched() {
        let original = item(dec!(50)).with_sale_price(dec!(40));
        let request = DiscountRequest::new(dec!(10)).skipping_discounted();

        let outcome = DiscountApplier::apply(&original, &request);
        assert_eq!(outcome, Ok(DiscountOutcome::Skip(SkipReason::AlreadyDiscounted)));

        let after = applied(original.clone(), &request);
        assert_eq!(after, original);
        assert_eq!(after.sale_price(), Some(dec!(40)));
    }

    #[test]
    fn skip_policy_reapplies_over_zero_sale_price() {
        let free = applied(item(dec!(50)), &DiscountRequest::new(dec!(100)));
        assert_eq!(free.sale_price(), Some(dec!(0)));
        assert!(!free.is_discounted());

        let after = applied(free, &DiscountRequest::new(dec!(10)).skipping_discounted());
        assert_eq!(after.sale_price(), Some(dec!(45)));
        assert_eq!(after.discount_percent(), Some(dec!(10)));
    }

    #[test]
    fn unrepresentable_sale_price_is_an_error() {
        let result = DiscountApplier::apply(&item(Decimal::MAX), &DiscountRequest::new(dec!(20)));
        assert!(matches!(result, Err(DomainError::Overflow(_))));
        assert_eq!(discounted_price(Decimal::MAX, dec!(20)), None);
        assert_eq!(discounted_price(dec!(100), dec!(20)), Some(dec!(80)));
    }

    #[test]
    fn without_skip_policy_existing_discount_is_replaced() {
        let after = applied(
            item(dec!(50)).with_sale_price(dec!(40)),
            &DiscountRequest::new(dec!(10)),
        );
        assert_eq!(after.sale_price(), Some(dec!(45)));
    }

    #[test]
    fn skip_policy_ignores_items_without_sale_price() {
        let after = applied(item(dec!(50)), &DiscountRequest::new(dec!(10)).skipping_discounted());
        assert_eq!(after.sale_price(), Some(dec!(45)));
    }

    #[test]
    fn window_is_copied_from_request() {
        let request =
            DiscountRequest::new(dec!(15)).with_window(Some(date(2026, 11, 1)), Some(date(2026, 11, 30)));
        let after = applied(item(dec!(200)), &request);
        let window = after.sale_window().unwrap();
        assert_eq!(window.from, Some(date(2026, 11, 1)));
        assert_eq!(window.to, Some(date(2026, 11, 30)));
    }

    #[test]
    fn reapplying_without_window_drops_old_window() {
        let dated = DiscountRequest::new(dec!(15)).with_window(Some(date(2026, 11, 1)), None);
        let after = applied(item(dec!(200)), &dated);
        assert!(after.sale_window().is_some());

        let after = applied(after, &DiscountRequest::new(dec!(15)));
        assert_eq!(after.sale_window(), None);
    }

    #[test]
    fn out_of_range_percent_is_applied_as_given() {
        let after = applied(item(dec!(100)), &DiscountRequest::new(dec!(150)));
        assert_eq!(after.sale_price(), Some(dec!(-50)));
        assert!(DiscountRequest::new(dec!(150)).validate().is_err());
    }

    #[test]
    fn zero_percent_writes_no_sale_price() {
        let after = applied(item(dec!(100)), &DiscountRequest::new(dec!(0)));
        assert_eq!(after.sale_price(), None);
        assert_eq!(after.discount_percent(), Some(dec!(0)));
    }

    #[test]
    fn clear_empties_every_discount_field() {
        let discounted = item(dec!(100))
            .with_sale_price(dec!(80))
            .with_discount_percent(dec!(20))
            .with_sale_window(SaleWindow::new(Some(date(2026, 1, 1)), None));

        let mut after = discounted.clone();
        after.apply(&DiscountClearer::clear(&discounted));
        assert!(after.is_clear());
        assert_eq!(after.regular_price(), dec!(100));
    }

    #[test]
    fn validate_accepts_bounds() {
        assert!(DiscountRequest::new(dec!(100)).validate().is_ok());
        assert!(DiscountRequest::new(dec!(0.01)).validate().is_ok());
        assert!(DiscountRequest::new(dec!(0)).validate().is_err());
        assert!(DiscountRequest::new(dec!(-3)).validate().is_err());
    }

    #[test]
    fn parse_reads_form_values() {
        let request = DiscountRequest::parse(" 12.5 ", "2026-10-01", "", true).unwrap();
        assert_eq!(request.percent, dec!(12.5));
        assert_eq!(request.start_date, Some(date(2026, 10, 1)));
        assert_eq!(request.end_date, None);
        assert!(request.skip_if_discounted);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(matches!(
            DiscountRequest::parse("ten", "", "", false),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            DiscountRequest::parse("10", "01/10/2026", "", false),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            DiscountRequest::parse("101", "", "", false),
            Err(DomainError::Validation(_))
        ));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn price() -> impl Strategy<Value = Decimal> {
            (0u32..10_000_000).prop_map(|cents| Decimal::new(cents as i64, 2))
        }

        fn nonzero_price() -> impl Strategy<Value = Decimal> {
            (1u32..10_000_000).prop_map(|cents| Decimal::new(cents as i64, 2))
        }

        fn percent() -> impl Strategy<Value = Decimal> {
            (1u32..=10_000).prop_map(|bp| Decimal::new(bp as i64, 2))
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: clearing twice equals clearing once.
            #[test]
            fn clear_is_idempotent(regular in price(), pct in percent()) {
                let start = applied(item(regular), &DiscountRequest::new(pct));

                let mut once = start.clone();
                once.apply(&DiscountClearer::clear(&once));
                let mut twice = once.clone();
                twice.apply(&DiscountClearer::clear(&twice));

                prop_assert_eq!(&once, &twice);
                prop_assert!(twice.is_clear());
            }

            /// Property: apply then clear restores the base price and empties discount state.
            #[test]
            fn apply_then_clear_round_trips(regular in price(), pct in percent()) {
                let mut after = applied(item(regular), &DiscountRequest::new(pct));
                after.apply(&DiscountClearer::clear(&after));

                prop_assert_eq!(after.regular_price(), regular);
                prop_assert!(after.is_clear());
            }

            /// Property: a sale price written by apply matches the percent annotation.
            #[test]
            fn applied_prices_are_consistent(regular in price(), pct in percent()) {
                let after = applied(item(regular), &DiscountRequest::new(pct));
                prop_assert!(after.is_price_consistent());
                prop_assert_eq!(after.discount_percent(), Some(pct));
                if regular > Decimal::ZERO {
                    prop_assert!(after.sale_price().unwrap() < regular);
                }
            }

            /// Property: skip policy never changes an already discounted item.
            #[test]
            fn skip_policy_is_bit_for_bit(regular in price(), sale in nonzero_price(), pct in percent()) {
                let original = item(regular).with_sale_price(sale);
                let after = applied(original.clone(), &DiscountRequest::new(pct).skipping_discounted());
                prop_assert_eq!(after.sale_price(), original.sale_price());
                prop_assert_eq!(after, original);
            }
        }
    }
}
