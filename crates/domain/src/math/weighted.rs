use crate::error::{DomainError, DomainResult};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Normalizes raw weights (any scale: `[50, 50]`, `[0.8, 0.2]`, ...) to
/// fractions summing to 1.
///
/// # Errors
/// `InvalidInput` when fewer than two weights are given, a weight is
/// negative, or they sum to zero.
pub fn normalize_weights(weights: &[Decimal]) -> DomainResult<Vec<Decimal>> {
    if weights.len() < 2 {
        return Err(DomainError::invalid("at least two token weights required"));
    }
    if weights.iter().any(|w| w.is_sign_negative()) {
        return Err(DomainError::invalid("token weights must be non-negative"));
    }
    let total: Decimal = weights.iter().copied().sum();
    if total.is_zero() {
        return Err(DomainError::invalid("token weights must not all be zero"));
    }
    Ok(weights.iter().map(|w| w / total).collect())
}

/// Whether a two-asset weight vector is 50/50 within a 1% tolerance.
/// Balanced pools route to the constant-product closed form.
#[must_use]
pub fn is_balanced(normalized: &[Decimal]) -> bool {
    let half = Decimal::new(5, 1);
    let tolerance = Decimal::new(1, 2);
    normalized.len() == 2 && normalized.iter().all(|w| (*w - half).abs() < tolerance)
}

/// Impermanent loss for a weighted pool as a percentage (negative = loss).
///
/// The invariant generalizes to `∏ balance_i ^ weight_i = k`; comparing the
/// rebalanced pool value against holding the deposit reduces to
///
/// `IL = ∏ ratio_i ^ w_i / Σ w_i * ratio_i − 1`
///
/// where `ratio_i` is each token's price change factor and `w_i` the
/// normalized weight. With two tokens at 50/50 this is exactly the
/// constant-product closed form.
pub fn weighted_il_percent(
    price_ratios: &[Decimal],
    weights: &[Decimal],
) -> DomainResult<Decimal> {
    if price_ratios.len() != weights.len() {
        return Err(DomainError::invalid(
            "price ratios and weights must have the same length",
        ));
    }
    let normalized = normalize_weights(weights)?;
    if price_ratios.iter().any(|r| *r <= Decimal::ZERO) {
        return Err(DomainError::invalid(
            "price ratios must be strictly positive",
        ));
    }

    let mut geometric = 1.0f64;
    let mut arithmetic = 0.0f64;
    for (ratio, weight) in price_ratios.iter().zip(normalized.iter()) {
        let r = ratio.to_f64().ok_or_else(overflow)?;
        let w = weight.to_f64().ok_or_else(overflow)?;
        geometric *= r.powf(w);
        arithmetic += w * r;
    }
    if arithmetic == 0.0 {
        return Err(DomainError::invalid("weighted price sum is zero"));
    }

    let il = geometric / arithmetic - 1.0;
    Decimal::from_f64(il * 100.0).ok_or_else(overflow)
}

fn overflow() -> DomainError {
    DomainError::invalid("value out of range for decimal arithmetic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constant_product;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_percent_scale() {
        let w = normalize_weights(&[dec!(80), dec!(20)]).unwrap();
        assert_eq!(w, vec![dec!(0.8), dec!(0.2)]);
    }

    #[test]
    fn test_normalize_rejects_bad_weights() {
        assert!(normalize_weights(&[dec!(100)]).is_err());
        assert!(normalize_weights(&[dec!(-50), dec!(150)]).is_err());
        assert!(normalize_weights(&[dec!(0), dec!(0)]).is_err());
    }

    #[test]
    fn test_is_balanced() {
        assert!(is_balanced(&[dec!(0.5), dec!(0.5)]));
        assert!(is_balanced(&[dec!(0.495), dec!(0.505)]));
        assert!(!is_balanced(&[dec!(0.8), dec!(0.2)]));
        assert!(!is_balanced(&[dec!(0.34), dec!(0.33), dec!(0.33)]));
    }

    #[test]
    fn test_reduces_to_constant_product_at_50_50() {
        // token1 fixed, token0 doubles: relative ratio 2 either way round
        let weighted =
            weighted_il_percent(&[dec!(2), dec!(1)], &[dec!(50), dec!(50)]).unwrap();
        let closed = constant_product::il_fraction(dec!(2)).unwrap() * dec!(100);
        assert!((weighted - closed).abs() < dec!(0.000001));
    }

    #[test]
    fn test_80_20_smaller_loss_than_50_50() {
        // The heavier the dominant asset, the closer the pool is to holding it
        let balanced =
            weighted_il_percent(&[dec!(2), dec!(1)], &[dec!(50), dec!(50)]).unwrap();
        let skewed = weighted_il_percent(&[dec!(2), dec!(1)], &[dec!(80), dec!(20)]).unwrap();
        assert!(skewed > balanced);
        assert!(skewed < Decimal::ZERO);
    }

    #[test]
    fn test_multi_asset_tripool() {
        let il = weighted_il_percent(
            &[dec!(1.2), dec!(0.9), dec!(1.0)],
            &[dec!(1), dec!(1), dec!(1)],
        )
        .unwrap();
        // divergence among three assets still loses to holding
        assert!(il < Decimal::ZERO);
        assert!(il > dec!(-5));
    }

    #[test]
    fn test_no_divergence_no_loss() {
        // all prices move together: geometric and arithmetic means agree
        let il = weighted_il_percent(&[dec!(3), dec!(3)], &[dec!(60), dec!(40)]).unwrap();
        assert!(il.abs() < dec!(0.000001));
    }

    #[test]
    fn test_rejects_non_positive_ratio() {
        assert!(weighted_il_percent(&[dec!(0), dec!(1)], &[dec!(50), dec!(50)]).is_err());
        assert!(weighted_il_percent(&[dec!(-1), dec!(1)], &[dec!(50), dec!(50)]).is_err());
    }
}
