use crate::enums::PoolKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Snapshot of pool state resolved by the data layer, consumed read-only by
/// the metrics. Weights and fee rate fall back to pool-kind defaults when
/// the source could not supply them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolContext {
    pub pool_kind: PoolKind,
    /// Raw token weights, any scale (`[50, 50]`, `[0.8, 0.2]`).
    pub token_weights: Vec<Decimal>,
    /// Swap fee as a fraction (0.003 = 0.3%).
    pub fee_rate: Decimal,
    pub tvl_usd: Decimal,
    pub volume_window_usd: Decimal,
}

impl PoolContext {
    /// Creates a context with 50/50 weights and the pool kind's default fee.
    #[must_use]
    pub fn new(pool_kind: PoolKind, tvl_usd: Decimal, volume_window_usd: Decimal) -> Self {
        Self {
            pool_kind,
            token_weights: vec![Decimal::from(50), Decimal::from(50)],
            fee_rate: pool_kind.default_fee_rate(),
            tvl_usd,
            volume_window_usd,
        }
    }

    #[must_use]
    pub fn with_weights(mut self, weights: Vec<Decimal>) -> Self {
        self.token_weights = weights;
        self
    }

    #[must_use]
    pub fn with_fee_rate(mut self, fee_rate: Decimal) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    /// Fee tier for display, as a percentage.
    #[must_use]
    pub fn fee_tier_percent(&self) -> Decimal {
        self.fee_rate * Decimal::from(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let ctx = PoolContext::new(PoolKind::UniswapV2, dec!(1000000), dec!(500000));
        assert_eq!(ctx.token_weights, vec![dec!(50), dec!(50)]);
        assert_eq!(ctx.fee_rate, dec!(0.003));
        assert_eq!(ctx.fee_tier_percent(), dec!(0.300));
    }

    #[test]
    fn test_builders() {
        let ctx = PoolContext::new(PoolKind::BalancerWeighted, dec!(1), dec!(1))
            .with_weights(vec![dec!(80), dec!(20)])
            .with_fee_rate(dec!(0.001));
        assert_eq!(ctx.token_weights, vec![dec!(80), dec!(20)]);
        assert_eq!(ctx.fee_rate, dec!(0.001));
    }
}
