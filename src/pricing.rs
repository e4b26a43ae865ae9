//! Pricing
//!
//! Derived totals for a set of line items. Nothing here is stored: every figure is recomputed
//! from the items it is given, so it cannot drift from the cart.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{
    FormattableCurrency as _, Formatter, LocalFormat, Money, Params,
    iso::{Currency, INR},
};
use thiserror::Error;

use crate::items::CartLineItem;

/// Default promotional discount applied to the whole cart (10%).
pub const DEFAULT_DISCOUNT: f64 = 0.1;

/// Subtotal at or above which delivery is free, in rupees.
pub const DEFAULT_FREE_DELIVERY_THRESHOLD: u64 = 999;

/// Flat delivery charge below the threshold, in rupees.
pub const DEFAULT_DELIVERY_CHARGE: u64 = 50;

/// Errors that can occur while deriving prices.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// An amount did not fit in the integer range used for rupees.
    #[error("price arithmetic overflowed")]
    Overflow,

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// An item carried a quantity below one.
    #[error("item {0} has a non-positive quantity")]
    NonPositiveQuantity(String),
}

/// Discount and delivery rules applied at checkout.
#[derive(Debug, Clone, Copy)]
pub struct PricingPolicy {
    discount: Percentage,
    free_delivery_threshold: u64,
    delivery_charge: u64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            discount: Percentage::from(DEFAULT_DISCOUNT),
            free_delivery_threshold: DEFAULT_FREE_DELIVERY_THRESHOLD,
            delivery_charge: DEFAULT_DELIVERY_CHARGE,
        }
    }
}

impl PricingPolicy {
    /// Creates a policy with explicit rules.
    pub fn new(discount: Percentage, free_delivery_threshold: u64, delivery_charge: u64) -> Self {
        Self {
            discount,
            free_delivery_threshold,
            delivery_charge,
        }
    }

    /// Discount expressed in percent points (e.g. `10` for 10%), to two decimal places.
    pub fn discount_percent_points(&self) -> Decimal {
        (self.discount * Decimal::ONE_HUNDRED)
            .round_dp(2)
            .normalize()
    }

    /// Discount on a subtotal, rounded down to whole rupees.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::PercentConversion`] if the amount cannot be represented.
    pub fn discount_on(&self, subtotal: u64) -> Result<u64, PricingError> {
        let subtotal = Decimal::from_u64(subtotal).ok_or(PricingError::PercentConversion)?;

        // Percentages built from f64 carry binary noise; settle it before flooring.
        (self.discount * Decimal::ONE)
            .checked_mul(subtotal)
            .ok_or(PricingError::PercentConversion)?
            .round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero)
            .round_dp_with_strategy(0, RoundingStrategy::ToNegativeInfinity)
            .to_u64()
            .ok_or(PricingError::PercentConversion)
    }

    /// How much more must be spent before delivery is free; zero once it already is.
    pub fn shortfall_for_free_delivery(&self, subtotal: u64) -> u64 {
        self.free_delivery_threshold.saturating_sub(subtotal)
    }

    /// Delivery charge owed for a subtotal.
    pub fn delivery_charge_for(&self, subtotal: u64) -> u64 {
        if subtotal >= self.free_delivery_threshold {
            0
        } else {
            self.delivery_charge
        }
    }

    /// Derives the full price breakdown for a set of cart items.
    ///
    /// # Errors
    ///
    /// - [`PricingError::Overflow`]: an amount exceeded the supported range.
    /// - [`PricingError::NonPositiveQuantity`]: an item was not a valid cart entry.
    /// - [`PricingError::PercentConversion`]: the discount could not be calculated.
    pub fn breakdown(&self, items: &[CartLineItem]) -> Result<PriceBreakdown, PricingError> {
        let subtotal = subtotal(items)?;
        let discount = self.discount_on(subtotal)?;
        let delivery_charge = self.delivery_charge_for(subtotal);

        let total = subtotal
            .checked_sub(discount)
            .and_then(|amount| amount.checked_add(delivery_charge))
            .ok_or(PricingError::Overflow)?;

        Ok(PriceBreakdown {
            subtotal,
            discount,
            delivery_charge,
            total,
        })
    }
}

/// Sum of `price * quantity` over the items.
///
/// # Errors
///
/// Returns an error if an item has a non-positive quantity or the sum overflows.
pub fn subtotal(items: &[CartLineItem]) -> Result<u64, PricingError> {
    items.iter().try_fold(0_u64, |acc, item| {
        if item.quantity() <= 0 {
            return Err(PricingError::NonPositiveQuantity(item.key().to_string()));
        }

        item.line_total()
            .and_then(|line| acc.checked_add(line))
            .ok_or(PricingError::Overflow)
    })
}

/// Derived totals for an order, in whole rupees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceBreakdown {
    /// Sum of line totals
    pub subtotal: u64,

    /// Cart-wide discount
    pub discount: u64,

    /// Delivery charge
    pub delivery_charge: u64,

    /// Amount payable
    pub total: u64,
}

impl PriceBreakdown {
    /// Breakdown for buying a single line directly, outside the cart.
    ///
    /// Direct purchases are charged at list price: no discount and no delivery charge.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is non-positive or the total overflows.
    pub fn direct_purchase(item: &CartLineItem) -> Result<Self, PricingError> {
        let total = subtotal(std::slice::from_ref(item))?;

        Ok(Self {
            subtotal: total,
            discount: 0,
            delivery_charge: 0,
            total,
        })
    }

    /// Amount saved on this order.
    pub fn savings(&self) -> u64 {
        self.discount
    }

    /// Returns `true` when delivery costs nothing.
    pub fn is_free_delivery(&self) -> bool {
        self.delivery_charge == 0
    }
}

/// Converts whole rupees into an INR money value.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the amount does not fit in an `i64`.
pub fn rupees(amount: u64) -> Result<Money<'static, Currency>, PricingError> {
    let amount = i64::try_from(amount).map_err(|_err| PricingError::Overflow)?;

    Ok(Money::from_major(amount, INR))
}

/// Formats whole rupees with the currency's symbol and digit grouping, e.g. `₹12,34,567`.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the amount does not fit in an `i64`.
pub fn format_rupees(amount: u64) -> Result<String, PricingError> {
    let money = rupees(amount)?;
    let format = LocalFormat::from_locale(INR.locale());

    let params = Params {
        digit_separator: format.digit_separator,
        exponent_separator: format.exponent_separator,
        separator_pattern: format.digit_separator_pattern,
        rounding: Some(0),
        symbol: Some(INR.symbol()),
        ..Params::default()
    };

    Ok(Formatter::money(&money, params))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn items_totalling(amounts: &[u64]) -> Vec<CartLineItem> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| CartLineItem::new(i as u64, format!("Item {i}"), *amount))
            .collect()
    }

    #[test]
    fn subtotal_sums_price_times_quantity() -> TestResult {
        let items = [
            CartLineItem::new("a", "A", 300).with_quantity(2),
            CartLineItem::new("b", "B", 400),
        ];

        assert_eq!(subtotal(&items)?, 1000);

        Ok(())
    }

    #[test]
    fn subtotal_of_nothing_is_zero() -> TestResult {
        assert_eq!(subtotal(&[])?, 0);

        Ok(())
    }

    #[test]
    fn subtotal_rejects_non_positive_quantity() {
        let items = [CartLineItem::new("a", "A", 300).with_quantity(0)];

        assert!(matches!(
            subtotal(&items),
            Err(PricingError::NonPositiveQuantity(_))
        ));
    }

    #[test]
    fn subtotal_overflow_is_an_error() {
        let items = items_totalling(&[u64::MAX, 1]);

        assert_eq!(subtotal(&items), Err(PricingError::Overflow));
    }

    #[test]
    fn breakdown_at_one_thousand_gets_free_delivery() -> TestResult {
        let breakdown = PricingPolicy::default().breakdown(&items_totalling(&[1000]))?;

        assert_eq!(
            breakdown,
            PriceBreakdown {
                subtotal: 1000,
                discount: 100,
                delivery_charge: 0,
                total: 900,
            }
        );

        Ok(())
    }

    #[test]
    fn breakdown_at_five_hundred_pays_delivery() -> TestResult {
        let breakdown = PricingPolicy::default().breakdown(&items_totalling(&[200, 300]))?;

        assert_eq!(
            breakdown,
            PriceBreakdown {
                subtotal: 500,
                discount: 50,
                delivery_charge: 50,
                total: 500,
            }
        );

        Ok(())
    }

    #[test]
    fn threshold_is_inclusive() -> TestResult {
        let policy = PricingPolicy::default();

        assert_eq!(policy.delivery_charge_for(999), 0);
        assert_eq!(policy.delivery_charge_for(998), 50);

        let breakdown = policy.breakdown(&items_totalling(&[999]))?;

        assert_eq!(breakdown.discount, 99);
        assert_eq!(breakdown.total, 900);

        Ok(())
    }

    #[test]
    fn discount_rounds_down() -> TestResult {
        let policy = PricingPolicy::default();

        assert_eq!(policy.discount_on(9)?, 0);
        assert_eq!(policy.discount_on(19)?, 1);
        assert_eq!(policy.discount_on(1299)?, 129);

        Ok(())
    }

    #[test]
    fn empty_cart_breakdown_charges_delivery_only() -> TestResult {
        let breakdown = PricingPolicy::default().breakdown(&[])?;

        assert_eq!(breakdown.subtotal, 0);
        assert_eq!(breakdown.discount, 0);
        assert_eq!(breakdown.delivery_charge, 50);
        assert_eq!(breakdown.total, 50);

        Ok(())
    }

    #[test]
    fn custom_policy_is_respected() -> TestResult {
        let policy = PricingPolicy::new(Percentage::from(0.25), 2000, 99);
        let breakdown = policy.breakdown(&items_totalling(&[1000]))?;

        assert_eq!(breakdown.discount, 250);
        assert_eq!(breakdown.delivery_charge, 99);
        assert_eq!(breakdown.total, 849);

        Ok(())
    }

    #[test]
    fn discount_percent_points_for_default_policy() {
        assert_eq!(
            PricingPolicy::default().discount_percent_points(),
            Decimal::from(10)
        );
    }

    #[test]
    fn direct_purchase_has_no_discount_or_delivery() -> TestResult {
        let item = CartLineItem::new("a", "A", 450).with_quantity(2);

        let breakdown = PriceBreakdown::direct_purchase(&item)?;

        assert_eq!(breakdown.subtotal, 900);
        assert_eq!(breakdown.total, 900);
        assert_eq!(breakdown.savings(), 0);
        assert!(breakdown.is_free_delivery());

        Ok(())
    }

    #[test]
    fn shortfall_counts_down_to_the_threshold() {
        let policy = PricingPolicy::default();

        assert_eq!(policy.shortfall_for_free_delivery(0), 999);
        assert_eq!(policy.shortfall_for_free_delivery(899), 100);
        assert_eq!(policy.shortfall_for_free_delivery(999), 0);
        assert_eq!(policy.shortfall_for_free_delivery(1500), 0);
    }

    #[test]
    fn rupees_are_whole_and_grouped_in_lakhs() -> TestResult {
        assert_eq!(format_rupees(0)?, "₹0");
        assert_eq!(format_rupees(999)?, "₹999");
        assert_eq!(format_rupees(1697)?, "₹1,697");
        assert_eq!(format_rupees(1_234_567)?, "₹12,34,567");

        Ok(())
    }

    #[test]
    fn rupees_overflow_is_an_error() {
        assert!(matches!(rupees(u64::MAX), Err(PricingError::Overflow)));
        assert_eq!(format_rupees(u64::MAX), Err(PricingError::Overflow));
    }
}
