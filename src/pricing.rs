//! Order totals, platform fees and coupon discount. Pure computation, no I/O.
//!
//! ```text
//! subtotal     = Σ price · qty · (1 − discount)
//! commission   = Σ categoryRate · price · qty
//! couponValue  = min(percentage · subtotal | fixed, subtotal)
//! total        = subtotal − couponValue + shippingFee
//! transaction  = total · transactionRate
//! service      = flat service fee
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CouponDiscount, Fees, Money, OrderLineItem};
use crate::error::ErrorKind;

/// Platform fee constants, loaded from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    /// Fraction of the post-discount total retained per order.
    pub transaction_rate: f64,
    /// Flat amount retained per order.
    pub service_fee: Money,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self { transaction_rate: 0.02, service_fee: Money::ZERO }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("Order amount out of range while computing the {0}")]
    Overflow(&'static str),
}

impl PricingError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

/// A snapshotted line item together with its category's commission rate.
#[derive(Debug, Clone, Copy)]
pub struct ChargeLine<'a> {
    pub item: &'a OrderLineItem,
    pub commission_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub coupon_value: Money,
    pub total: Money,
    pub fees: Fees,
}

fn gross(item: &OrderLineItem) -> Result<Money, PricingError> {
    item.price.checked_mul(item.quantity).ok_or(PricingError::Overflow("line amount"))
}

pub fn line_subtotal(item: &OrderLineItem) -> Result<Money, PricingError> {
    Ok(gross(item)?.scale(1.0 - item.discount))
}

/// Discount granted by a coupon, never more than the subtotal and never negative.
pub fn coupon_value(discount: &CouponDiscount, subtotal: Money) -> Money {
    let raw = match discount {
        CouponDiscount::Percentage(rate) => subtotal.scale(*rate),
        CouponDiscount::Fixed(amount) => *amount,
    };
    raw.min(subtotal).max(Money::ZERO)
}

fn checked_sum(
    mut amounts: impl Iterator<Item = Result<Money, PricingError>>,
    what: &'static str,
) -> Result<Money, PricingError> {
    amounts.try_fold(Money::ZERO, |acc, amount| acc.checked_add(amount?).ok_or(PricingError::Overflow(what)))
}

/// Price an order.
///
/// # Errors
/// Fails when any intermediate amount, or the seller's net revenue, would
/// leave the `i64` range.
pub fn compute_total(
    lines: &[ChargeLine<'_>],
    coupon: Option<&CouponDiscount>,
    shipping_fee: Money,
    schedule: &FeeSchedule,
) -> Result<OrderTotals, PricingError> {
    let subtotal = checked_sum(lines.iter().map(|line| line_subtotal(line.item)), "subtotal")?;
    let commission = checked_sum(
        lines.iter().map(|line| Ok(gross(line.item)?.scale(line.commission_rate))),
        "commission",
    )?;

    let coupon_value = coupon.map(|c| coupon_value(c, subtotal)).unwrap_or(Money::ZERO);
    let total = subtotal
        .checked_sub(coupon_value)
        .and_then(|net| net.checked_add(shipping_fee))
        .ok_or(PricingError::Overflow("total"))?;

    let fees = Fees {
        commission,
        transaction: total.scale(schedule.transaction_rate),
        service: schedule.service_fee,
    };
    // Settlement later computes `total - fees`; it must stay representable.
    fees.commission
        .checked_add(fees.transaction)
        .and_then(|sum| sum.checked_add(fees.service))
        .and_then(|sum| total.checked_sub(sum))
        .ok_or(PricingError::Overflow("fees"))?;

    Ok(OrderTotals { subtotal, coupon_value, total, fees })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductId;

    fn item(price: i64, quantity: u32, discount: f64) -> OrderLineItem {
        OrderLineItem { product_id: ProductId::new("p"), quantity, price: Money::new(price), discount }
    }

    #[test]
    fn test_fixed_coupon_with_shipping() {
        let line = item(100, 2, 0.0);
        let totals = compute_total(
            &[ChargeLine { item: &line, commission_rate: 0.0 }],
            Some(&CouponDiscount::Fixed(Money::new(50))),
            Money::new(20),
            &FeeSchedule::default(),
        )
        .unwrap();
        assert_eq!(totals.subtotal, Money::new(200));
        assert_eq!(totals.coupon_value, Money::new(50));
        assert_eq!(totals.total, Money::new(170));
    }

    #[test]
    fn test_percentage_coupon_is_clamped_to_subtotal() {
        let line = item(100, 1, 0.0);
        let lines = [ChargeLine { item: &line, commission_rate: 0.0 }];
        let schedule = FeeSchedule::default();

        let sixty = compute_total(&lines, Some(&CouponDiscount::Percentage(0.6)), Money::ZERO, &schedule).unwrap();
        assert_eq!(sixty.coupon_value, Money::new(60));
        assert_eq!(sixty.total, Money::new(40));

        let over = compute_total(&lines, Some(&CouponDiscount::Percentage(1.5)), Money::new(15), &schedule).unwrap();
        assert_eq!(over.coupon_value, Money::new(100));
        assert_eq!(over.total, Money::new(15));
    }

    #[test]
    fn test_fixed_coupon_larger_than_subtotal() {
        assert_eq!(coupon_value(&CouponDiscount::Fixed(Money::new(500)), Money::new(120)), Money::new(120));
    }

    #[test]
    fn test_fees() {
        let discounted = item(1_000, 3, 0.1);
        let plain = item(500, 2, 0.0);
        let lines = [
            ChargeLine { item: &discounted, commission_rate: 0.05 },
            ChargeLine { item: &plain, commission_rate: 0.1 },
        ];
        let schedule = FeeSchedule { transaction_rate: 0.02, service_fee: Money::new(7) };
        let totals = compute_total(&lines, None, Money::new(30), &schedule).unwrap();

        assert_eq!(totals.subtotal, Money::new(2_700 + 1_000));
        // Commission is charged on the gross line price.
        assert_eq!(totals.fees.commission, Money::new(150 + 100));
        assert_eq!(totals.total, Money::new(3_730));
        assert_eq!(totals.fees.transaction, Money::new(75));
        assert_eq!(totals.fees.service, Money::new(7));
    }

    #[test]
    fn test_total_identity_holds() {
        let lines_data = [item(333, 7, 0.15), item(49, 1, 0.5), item(1_999, 2, 0.0)];
        let lines: Vec<_> = lines_data.iter().map(|item| ChargeLine { item, commission_rate: 0.03 }).collect();
        for coupon in [None, Some(CouponDiscount::Percentage(0.25)), Some(CouponDiscount::Fixed(Money::new(10_000)))] {
            let totals = compute_total(&lines, coupon.as_ref(), Money::new(25), &FeeSchedule::default()).unwrap();
            let expected_subtotal: Money = lines_data.iter().map(|item| line_subtotal(item).unwrap()).sum();
            assert_eq!(totals.subtotal, expected_subtotal);
            assert_eq!(totals.total, expected_subtotal - totals.coupon_value.min(expected_subtotal) + Money::new(25));
            assert!(totals.coupon_value <= totals.subtotal);
        }
    }

    #[test]
    fn test_amounts_beyond_i64_are_rejected() {
        let huge = item(i64::MAX / 2 + 1, 2, 0.0);
        let err = compute_total(
            &[ChargeLine { item: &huge, commission_rate: 0.0 }],
            None,
            Money::ZERO,
            &FeeSchedule::default(),
        )
        .unwrap_err();
        assert_eq!(err, PricingError::Overflow("line amount"));
        assert_eq!(err.kind(), ErrorKind::Validation);

        let big = item(i64::MAX / 2, 2, 0.0);
        let err = compute_total(
            &[ChargeLine { item: &big, commission_rate: 0.0 }],
            None,
            Money::new(10),
            &FeeSchedule::default(),
        )
        .unwrap_err();
        assert_eq!(err, PricingError::Overflow("total"));

        let first = item(i64::MAX / 2, 1, 0.0);
        let second = item(i64::MAX / 2, 1, 0.0);
        let third = item(10, 1, 0.0);
        let lines = [
            ChargeLine { item: &first, commission_rate: 0.0 },
            ChargeLine { item: &second, commission_rate: 0.0 },
            ChargeLine { item: &third, commission_rate: 0.0 },
        ];
        let err = compute_total(&lines, None, Money::ZERO, &FeeSchedule::default()).unwrap_err();
        assert_eq!(err, PricingError::Overflow("subtotal"));
    }
}
