//! Pricing

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{products::ProductSnapshot, quantity::Quantity};

/// Errors that can occur while aggregating cart prices.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A line total does not fit in minor units.
    #[error("line total overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Anything that can be priced as a cart line.
pub trait PricedLine<'a> {
    /// Current product snapshot, if the product still exists.
    fn snapshot(&self) -> Option<&ProductSnapshot<'a>>;

    /// Units on the line.
    fn quantity(&self) -> Quantity;
}

/// A bare priced line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line<'a> {
    /// Product snapshot
    pub snapshot: Option<ProductSnapshot<'a>>,

    /// Units on the line
    pub quantity: Quantity,
}

impl<'a> Line<'a> {
    /// Create a line for a known product.
    pub fn new(snapshot: ProductSnapshot<'a>, quantity: Quantity) -> Self {
        Self {
            snapshot: Some(snapshot),
            quantity,
        }
    }

    /// Create a line whose product snapshot is missing.
    pub fn unpriced(quantity: Quantity) -> Self {
        Self {
            snapshot: None,
            quantity,
        }
    }
}

impl<'a> PricedLine<'a> for Line<'a> {
    fn snapshot(&self) -> Option<&ProductSnapshot<'a>> {
        self.snapshot.as_ref()
    }

    fn quantity(&self) -> Quantity {
        self.quantity
    }
}

/// Effective unit price multiplied by quantity.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: the product does not fit in minor units.
pub fn line_total<'a>(
    snapshot: &ProductSnapshot<'a>,
    quantity: Quantity,
) -> Result<Money<'a, Currency>, PricingError> {
    let unit = snapshot.effective_price();

    multiply(&unit, quantity)
}

/// Sum of line totals over every line with a product snapshot.
///
/// Lines without a snapshot are skipped.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: a line total does not fit in minor units.
/// - [`PricingError::Money`]: a line is priced in a currency other than `currency`.
pub fn subtotal<'a, L: PricedLine<'a>>(
    lines: &[L],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, PricingError> {
    lines
        .iter()
        .filter_map(|line| line.snapshot().map(|snapshot| (snapshot, line.quantity())))
        .try_fold(Money::from_minor(0, currency), |acc, (snapshot, quantity)| {
            Ok(acc.add(line_total(snapshot, quantity)?)?)
        })
}

/// Total units across all lines, priced or not.
pub fn item_count<'a, L: PricedLine<'a>>(lines: &[L]) -> u64 {
    lines
        .iter()
        .map(|line| u64::from(line.quantity().get()))
        .sum()
}

/// Amount saved against list prices over every priced line.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: a line saving does not fit in minor units.
/// - [`PricingError::Money`]: a line is priced in a currency other than `currency`.
pub fn savings<'a, L: PricedLine<'a>>(
    lines: &[L],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, PricingError> {
    lines
        .iter()
        .filter_map(|line| line.snapshot().map(|snapshot| (snapshot, line.quantity())))
        .try_fold(Money::from_minor(0, currency), |acc, (snapshot, quantity)| {
            let per_unit = snapshot.price.sub(snapshot.effective_price())?;

            Ok(acc.add(multiply(&per_unit, quantity)?)?)
        })
}

/// Discount as whole percent points of the list price, rounded half away from zero.
///
/// Returns `None` when there is no discount, the list price is zero, or the two
/// prices are in different currencies.
pub fn discount_percent(
    list: &Money<'_, Currency>,
    discount: Option<&Money<'_, Currency>>,
) -> Option<i64> {
    let discount = discount?;

    if list.currency() != discount.currency() {
        return None;
    }

    let list_minor = Decimal::from(list.to_minor_units());

    if list_minor.is_zero() {
        return None;
    }

    let off = list_minor.checked_sub(Decimal::from(discount.to_minor_units()))?;

    off.checked_div(list_minor)?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

fn multiply<'a>(
    unit: &Money<'a, Currency>,
    quantity: Quantity,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = unit
        .to_minor_units()
        .checked_mul(i64::from(quantity.get()))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, unit.currency()))
}

/// Display-ready totals for a set of lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals<'a> {
    /// Total units across all lines
    pub item_count: u64,

    /// Amount payable for priced lines
    pub subtotal: Money<'a, Currency>,

    /// Amount saved against list prices
    pub savings: Money<'a, Currency>,

    /// Lines left out of the subtotal because their product is gone
    pub unpriced_lines: usize,
}

impl<'a> CartTotals<'a> {
    /// Aggregate the given lines.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line total overflows or is priced in
    /// another currency.
    pub fn from_lines<L: PricedLine<'a>>(
        lines: &[L],
        currency: &'a Currency,
    ) -> Result<Self, PricingError> {
        Ok(Self {
            item_count: item_count(lines),
            subtotal: subtotal(lines, currency)?,
            savings: savings(lines, currency)?,
            unpriced_lines: lines.iter().filter(|line| line.snapshot().is_none()).count(),
        })
    }

    /// Savings as a fraction of what the priced lines would cost at list price.
    pub fn savings_percent(&self) -> Percentage {
        let saved = Decimal::from(self.savings.to_minor_units());
        let list = Decimal::from(self.subtotal.to_minor_units()) + saved;

        if list.is_zero() {
            return Percentage::from(0.0);
        }

        Percentage::from(saved / list)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn on_sale<'a>() -> ProductSnapshot<'a> {
        ProductSnapshot::new(Money::from_minor(10_00, USD), 10)
            .with_discount(Money::from_minor(8_00, USD))
    }

    fn full_price<'a>() -> ProductSnapshot<'a> {
        ProductSnapshot::new(Money::from_minor(50_00, USD), 10)
    }

    #[test]
    fn line_total_uses_discount_price() -> TestResult {
        let total = line_total(&on_sale(), Quantity::new(3)?)?;

        assert_eq!(total, Money::from_minor(24_00, USD));

        Ok(())
    }

    #[test]
    fn line_total_uses_list_price_without_discount() -> TestResult {
        let total = line_total(&full_price(), Quantity::new(2)?)?;

        assert_eq!(total, Money::from_minor(100_00, USD));

        Ok(())
    }

    #[test]
    fn line_total_overflow_errors() -> TestResult {
        let snapshot = ProductSnapshot::new(Money::from_minor(i64::MAX, USD), 1);

        let result = line_total(&snapshot, Quantity::new(2)?);

        assert_eq!(result, Err(PricingError::Overflow));

        Ok(())
    }

    #[test]
    fn subtotal_and_item_count_of_empty_cart_are_zero() -> TestResult {
        let lines: [Line<'static>; 0] = [];

        assert_eq!(subtotal(&lines, USD)?, Money::from_minor(0, USD));
        assert_eq!(item_count(&lines), 0);

        Ok(())
    }

    #[test]
    fn subtotal_sums_line_totals() -> TestResult {
        let lines = [
            Line::new(on_sale(), Quantity::new(3)?),
            Line::new(full_price(), Quantity::new(2)?),
        ];

        assert_eq!(subtotal(&lines, USD)?, Money::from_minor(124_00, USD));
        assert_eq!(item_count(&lines), 5);

        Ok(())
    }

    #[test]
    fn subtotal_skips_unpriced_lines_but_item_count_does_not() -> TestResult {
        let lines = [
            Line::new(full_price(), Quantity::new(1)?),
            Line::unpriced(Quantity::new(4)?),
        ];

        assert_eq!(subtotal(&lines, USD)?, Money::from_minor(50_00, USD));
        assert_eq!(item_count(&lines), 5);

        Ok(())
    }

    #[test]
    fn subtotal_errors_on_currency_mismatch() -> TestResult {
        let lines = [Line::new(
            ProductSnapshot::new(Money::from_minor(1_00, GBP), 1),
            Quantity::ONE,
        )];

        assert_eq!(
            subtotal(&lines, USD),
            Err(PricingError::Money(MoneyError::CurrencyMismatch {
                expected: USD.iso_alpha_code,
                actual: GBP.iso_alpha_code,
            }))
        );

        Ok(())
    }

    #[test]
    fn discount_percent_rounds_to_whole_points() {
        let list = Money::from_minor(10_00, USD);

        assert_eq!(
            discount_percent(&list, Some(&Money::from_minor(8_00, USD))),
            Some(20)
        );
        assert_eq!(
            discount_percent(&Money::from_minor(3_00, USD), Some(&Money::from_minor(2_00, USD))),
            Some(33)
        );
        assert_eq!(
            discount_percent(&Money::from_minor(8_00, USD), Some(&Money::from_minor(7_46, USD))),
            Some(7)
        );
    }

    #[test]
    fn discount_percent_is_none_without_discount() {
        assert_eq!(discount_percent(&Money::from_minor(10_00, USD), None), None);
    }

    #[test]
    fn discount_percent_is_none_for_zero_list_price() {
        let free = Money::from_minor(0, USD);

        assert_eq!(discount_percent(&free, Some(&free)), None);
    }

    #[test]
    fn discount_percent_is_none_across_currencies() {
        assert_eq!(
            discount_percent(&Money::from_minor(10_00, USD), Some(&Money::from_minor(8_00, GBP))),
            None
        );
    }

    #[test]
    fn totals_report_savings_and_unpriced_lines() -> TestResult {
        let lines = [
            Line::new(on_sale(), Quantity::new(3)?),
            Line::new(full_price(), Quantity::new(1)?),
            Line::unpriced(Quantity::new(2)?),
        ];

        let totals = CartTotals::from_lines(&lines, USD)?;

        assert_eq!(totals.item_count, 6);
        assert_eq!(totals.subtotal, Money::from_minor(74_00, USD));
        assert_eq!(totals.savings, Money::from_minor(6_00, USD));
        assert_eq!(totals.unpriced_lines, 1);

        Ok(())
    }

    #[test]
    fn savings_percent_is_relative_to_list_total() -> TestResult {
        let lines = [Line::new(on_sale(), Quantity::new(1)?)];

        let totals = CartTotals::from_lines(&lines, USD)?;

        assert_eq!(totals.savings_percent() * Decimal::ONE, Decimal::new(2, 1));

        Ok(())
    }

    #[test]
    fn savings_percent_of_empty_cart_is_zero() -> TestResult {
        let lines: [Line<'static>; 0] = [];

        let totals = CartTotals::from_lines(&lines, USD)?;

        assert_eq!(totals.savings_percent() * Decimal::ONE, Decimal::ZERO);

        Ok(())
    }
}
