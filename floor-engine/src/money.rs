//! Money calculation using rust_decimal
//!
//! Totals are computed with `Decimal` and stored back as `f64` without
//! rounding. Rounding to cents happens only for display
//! ([`round_for_display`], [`format_money`]).
//!
//! Order of operations in [`recompute`]:
//! 1. subtotal = Σ price × quantity
//! 2. discount: percentage scales the subtotal, amount subtracts from it
//! 3. tax = subtotal × rate / 100, on the subtotal *before* discount
//! 4. total = discounted + tax (tip is recorded separately)

use rust_decimal::prelude::*;
use shared::{Discount, DiscountType, ModifierSelection, Order, OrderItem};

/// Display precision (cents)
const DECIMAL_PLACES: u32 = 2;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    match Decimal::from_f64(value) {
        Some(d) => d,
        None => {
            tracing::error!(value, "Non-representable money value, treating as zero");
            Decimal::ZERO
        }
    }
}

/// Convert Decimal back to f64 for storage (no rounding)
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Round to cents, half away from zero
pub fn round_for_display(value: f64) -> f64 {
    to_f64(to_decimal(value).round_dp_with_strategy(
        DECIMAL_PLACES,
        RoundingStrategy::MidpointAwayFromZero,
    ))
}

/// `98` -> `"98.00"`
pub fn format_money(value: f64) -> String {
    let rounded = to_decimal(value)
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Unit price = base price + Σ selected option prices
pub fn unit_price(base: f64, modifiers: &[ModifierSelection]) -> f64 {
    let options: Decimal = modifiers
        .iter()
        .flat_map(|m| m.options.iter())
        .map(|o| to_decimal(o.price))
        .sum();
    to_f64(to_decimal(base) + options)
}

/// price × quantity
pub fn line_total(item: &OrderItem) -> Decimal {
    to_decimal(item.price) * Decimal::from(item.quantity)
}

/// Σ price × quantity over any item selection
pub fn sum_items<'a>(items: impl IntoIterator<Item = &'a OrderItem>) -> Decimal {
    items.into_iter().map(line_total).sum()
}

/// Subtotal after discount. Never negative.
pub fn apply_discount(subtotal: Decimal, discount: Option<&Discount>) -> Decimal {
    let Some(discount) = discount else {
        return subtotal;
    };
    let value = to_decimal(discount.value);
    let discounted = match discount.kind {
        DiscountType::Percentage => {
            let pct = value.clamp(Decimal::ZERO, HUNDRED);
            subtotal * (Decimal::ONE - pct / HUNDRED)
        }
        DiscountType::Amount => subtotal - value,
    };
    discounted.max(Decimal::ZERO)
}

/// Tax on the pre-discount subtotal
pub fn tax_amount(subtotal: Decimal, tax_rate: f64) -> Decimal {
    if tax_rate == 0.0 {
        return Decimal::ZERO;
    }
    subtotal * to_decimal(tax_rate) / HUNDRED
}

/// Computed totals of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub discounted: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

pub fn compute(items: &[OrderItem], discount: Option<&Discount>, tax_rate: f64) -> Totals {
    let subtotal = sum_items(items);
    let discounted = apply_discount(subtotal, discount);
    let tax = tax_amount(subtotal, tax_rate);
    Totals {
        subtotal,
        discounted,
        tax,
        total: discounted + tax,
    }
}

/// Recompute `subtotal` and `total` of an order snapshot
pub fn recompute(mut order: Order) -> Order {
    let totals = compute(&order.items, order.discount.as_ref(), order.tax_rate);
    order.subtotal = to_f64(totals.subtotal);
    order.total = to_f64(totals.total);
    order
}
