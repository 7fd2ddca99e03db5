use crate::error::{DomainError, DomainResult};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// Coerces an f64 arriving from a loosely typed boundary (JSON, CLI args)
/// into a `Decimal`. NaN and infinity have no `Decimal` representation, so
/// this is where non-finite input dies.
pub fn decimal_input(value: f64, field: &str) -> DomainResult<Decimal> {
    Decimal::from_f64(value)
        .ok_or_else(|| DomainError::invalid(format!("{field} must be a finite number")))
}

/// Token quantities and USD prices at deposit time.
///
/// Construction validates the record; once built, every downstream formula
/// can assume a non-degenerate position (positive invariant product,
/// positive deposit value).
#[derive(Debug, Clone, Serialize)]
pub struct Position {
    amount0: Decimal,
    amount1: Decimal,
    initial_price0: Decimal,
    initial_price1: Decimal,
}

impl Position {
    /// Creates a validated position.
    ///
    /// # Errors
    /// `InvalidInput` when any value is negative, when `amount0 * amount1`
    /// is zero (the constant-product invariant degenerates), or when the
    /// deposit is worth nothing in USD.
    pub fn new(
        amount0: Decimal,
        amount1: Decimal,
        initial_price0: Decimal,
        initial_price1: Decimal,
    ) -> DomainResult<Self> {
        if amount0.is_sign_negative() || amount1.is_sign_negative() {
            return Err(DomainError::invalid("token amounts must be non-negative"));
        }
        if initial_price0.is_sign_negative() || initial_price1.is_sign_negative() {
            return Err(DomainError::invalid("token prices must be non-negative"));
        }
        if (amount0 * amount1).is_zero() {
            return Err(DomainError::invalid(
                "amount0 * amount1 must be positive for a constant-product position",
            ));
        }
        let initial_value = amount0 * initial_price0 + amount1 * initial_price1;
        if initial_value.is_zero() {
            return Err(DomainError::invalid("position has zero initial USD value"));
        }
        Ok(Self {
            amount0,
            amount1,
            initial_price0,
            initial_price1,
        })
    }

    #[must_use]
    pub fn amount0(&self) -> Decimal {
        self.amount0
    }

    #[must_use]
    pub fn amount1(&self) -> Decimal {
        self.amount1
    }

    #[must_use]
    pub fn initial_price0(&self) -> Decimal {
        self.initial_price0
    }

    #[must_use]
    pub fn initial_price1(&self) -> Decimal {
        self.initial_price1
    }

    /// USD value of the deposit at entry. Positive by construction.
    #[must_use]
    pub fn initial_value_usd(&self) -> Decimal {
        self.amount0 * self.initial_price0 + self.amount1 * self.initial_price1
    }
}

/// Relative move of the token0/token1 price since deposit, as a
/// multiplicative factor (1.0 = unchanged).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PriceMovement {
    ratio: Decimal,
}

impl PriceMovement {
    /// Creates a validated price movement.
    ///
    /// # Errors
    /// `InvalidInput` unless the ratio is strictly positive: market price
    /// ratios cannot be zero or negative under the model.
    pub fn new(ratio: Decimal) -> DomainResult<Self> {
        if ratio <= Decimal::ZERO {
            return Err(DomainError::invalid(
                "price ratio must be strictly positive",
            ));
        }
        Ok(Self { ratio })
    }

    #[must_use]
    pub fn ratio(&self) -> Decimal {
        self.ratio
    }
}

/// Fees accrued over the holding period.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeeRecord {
    fees_earned: Decimal,
    days_held: Decimal,
}

impl FeeRecord {
    /// Creates a validated fee record.
    ///
    /// # Errors
    /// `InvalidInput` when fees are negative or the holding period is not
    /// strictly positive (the annualization divides by it).
    pub fn new(fees_earned: Decimal, days_held: Decimal) -> DomainResult<Self> {
        if fees_earned.is_sign_negative() {
            return Err(DomainError::invalid("fees earned must be non-negative"));
        }
        if days_held <= Decimal::ZERO {
            return Err(DomainError::invalid("days held must be strictly positive"));
        }
        Ok(Self {
            fees_earned,
            days_held,
        })
    }

    #[must_use]
    pub fn fees_earned(&self) -> Decimal {
        self.fees_earned
    }

    #[must_use]
    pub fn days_held(&self) -> Decimal {
        self.days_held
    }

    /// Observation windows under a day amplify extrapolation error; callers
    /// surface this as a note rather than an error.
    #[must_use]
    pub fn is_short_window(&self) -> bool {
        self.days_held < Decimal::ONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_input_rejects_non_finite() {
        assert!(decimal_input(f64::NAN, "x").is_err());
        assert!(decimal_input(f64::INFINITY, "x").is_err());
        assert!(decimal_input(f64::NEG_INFINITY, "x").is_err());
        assert_eq!(decimal_input(1.5, "x").unwrap(), dec!(1.5));
    }

    #[test]
    fn test_position_rejects_degenerate() {
        // zero amount on one side kills the invariant product
        assert!(Position::new(dec!(0), dec!(1), dec!(2000), dec!(1)).is_err());
        // negative amount
        assert!(Position::new(dec!(-1), dec!(1), dec!(2000), dec!(1)).is_err());
        // zero USD value even with positive amounts
        assert!(Position::new(dec!(1), dec!(1), dec!(0), dec!(0)).is_err());
    }

    #[test]
    fn test_position_initial_value() {
        let p = Position::new(dec!(1), dec!(1), dec!(2000), dec!(1)).unwrap();
        assert_eq!(p.initial_value_usd(), dec!(2001));
    }

    #[test]
    fn test_price_movement_bounds() {
        assert!(PriceMovement::new(dec!(0)).is_err());
        assert!(PriceMovement::new(dec!(-1.5)).is_err());
        assert!(PriceMovement::new(dec!(0.25)).is_ok());
    }

    #[test]
    fn test_fee_record_bounds() {
        assert!(FeeRecord::new(dec!(-1), dec!(30)).is_err());
        assert!(FeeRecord::new(dec!(10), dec!(0)).is_err());
        let f = FeeRecord::new(dec!(10), dec!(0.5)).unwrap();
        assert!(f.is_short_window());
    }
}
