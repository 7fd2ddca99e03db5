use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// AMM pool families the estimator understands.
///
/// The variant set is closed: anything else must be rejected as
/// `UnsupportedPool` rather than silently treated as a 50/50 pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PoolKind {
    UniswapV2,
    UniswapV3,
    Sushiswap,
    BalancerWeighted,
    CurveStable,
}

impl PoolKind {
    /// Default swap fee as a fraction (0.003 = 0.3%), used when the data
    /// layer could not read the fee from the pool itself.
    #[must_use]
    pub fn default_fee_rate(&self) -> Decimal {
        match self {
            // 0.3% is the classic constant-product fee
            Self::UniswapV2 | Self::Sushiswap | Self::BalancerWeighted => {
                Decimal::new(3, 3)
            }
            // V3 tiers vary per pool; 0.3% is the most common
            Self::UniswapV3 => Decimal::new(3, 3),
            // Curve stable pools run much lower fees
            Self::CurveStable => Decimal::new(4, 4),
        }
    }

    /// Whether the pool holds correlated assets pegged to each other.
    #[must_use]
    pub fn is_stable(&self) -> bool {
        matches!(self, Self::CurveStable)
    }

    /// Wire name, matching the serde representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UniswapV2 => "uniswap-v2",
            Self::UniswapV3 => "uniswap-v3",
            Self::Sushiswap => "sushiswap",
            Self::BalancerWeighted => "balancer-weighted",
            Self::CurveStable => "curve-stable",
        }
    }

    /// Parses a wire name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "uniswap-v2" => Some(Self::UniswapV2),
            "uniswap-v3" => Some(Self::UniswapV3),
            "sushiswap" => Some(Self::Sushiswap),
            "balancer-weighted" | "balancer" => Some(Self::BalancerWeighted),
            "curve-stable" | "curve" => Some(Self::CurveStable),
            _ => None,
        }
    }
}
