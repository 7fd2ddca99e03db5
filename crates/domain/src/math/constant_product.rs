use crate::error::{DomainError, DomainResult};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// The invariant product `k = amount0 * amount1`.
#[must_use]
pub fn invariant_k(amount0: Decimal, amount1: Decimal) -> Decimal {
    amount0 * amount1
}

/// Holdings after the pool rebalances along `x * y = k` for a relative
/// price move by factor `price_ratio`:
///
/// `new_amount0 = amount0 / sqrt(ratio)`, `new_amount1 = amount1 * sqrt(ratio)`
///
/// The product is unchanged (`new0 * new1 = k`) while the reserve ratio
/// shifts by exactly `ratio`, so a ratio of 1 returns the deposit
/// untouched. For an equal-amount deposit this is the familiar
/// `sqrt(k / ratio)` / `sqrt(k * ratio)` pair.
///
/// `Decimal` has no sqrt, so the root is taken through f64, the same way
/// IL estimates tolerate it elsewhere in this crate.
pub fn rebalanced_amounts(
    amount0: Decimal,
    amount1: Decimal,
    price_ratio: Decimal,
) -> DomainResult<(Decimal, Decimal)> {
    if price_ratio <= Decimal::ZERO {
        return Err(DomainError::invalid(
            "price ratio must be strictly positive",
        ));
    }
    if invariant_k(amount0, amount1).is_zero() {
        return Err(DomainError::invalid("invariant product is zero"));
    }

    let ratio_f64 = price_ratio.to_f64().ok_or_else(overflow)?;
    let sqrt_ratio = Decimal::from_f64(ratio_f64.sqrt()).ok_or_else(overflow)?;
    if sqrt_ratio.is_zero() {
        return Err(DomainError::invalid("price ratio too small to represent"));
    }

    Ok((amount0 / sqrt_ratio, amount1 * sqrt_ratio))
}

/// Closed-form impermanent loss for a 50/50 constant-product pool, as a
/// fraction (negative means loss):
///
/// `IL = 2 * sqrt(r) / (1 + r) - 1`
///
/// Algebraically identical to comparing the rebalanced holdings from
/// [`rebalanced_amounts`] against holding the deposit; kept as the
/// cross-check the metrics tests assert against.
pub fn il_fraction(price_ratio: Decimal) -> DomainResult<Decimal> {
    if price_ratio <= Decimal::ZERO {
        return Err(DomainError::invalid(
            "price ratio must be strictly positive",
        ));
    }

    let ratio_f64 = price_ratio.to_f64().ok_or_else(overflow)?;
    let sqrt_ratio = ratio_f64.sqrt();
    let il = 2.0 * sqrt_ratio / (1.0 + ratio_f64) - 1.0;

    Decimal::from_f64(il).ok_or_else(overflow)
}

fn overflow() -> DomainError {
    DomainError::invalid("value out of range for decimal arithmetic")
}
