//! Request and response models.
//!
//! Requests arrive loosely typed (`f64` out of JSON) and are coerced into
//! the validated domain records before any arithmetic runs; anything
//! non-finite or out of range dies here with `InvalidInput`. Response
//! numbers are rounded to two decimals at this boundary only.

use lp_il_domain::{
    position::decimal_input, DomainResult, FeeRecord, IlReport, PoolKind, Position,
    PriceMovement, Recommendation,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Position-based calculation input: everything explicit, no external data.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculateRequest {
    pub initial_price_0: f64,
    pub initial_price_1: f64,
    pub current_price_ratio: f64,
    pub amount_0: f64,
    pub amount_1: f64,
    #[serde(default)]
    pub fees_earned: f64,
    pub days_held: f64,
}

impl CalculateRequest {
    /// Coerces into validated domain records.
    pub fn to_domain(&self) -> DomainResult<(Position, PriceMovement, FeeRecord)> {
        let position = Position::new(
            decimal_input(self.amount_0, "amount_0")?,
            decimal_input(self.amount_1, "amount_1")?,
            decimal_input(self.initial_price_0, "initial_price_0")?,
            decimal_input(self.initial_price_1, "initial_price_1")?,
        )?;
        let movement =
            PriceMovement::new(decimal_input(self.current_price_ratio, "current_price_ratio")?)?;
        let fees = FeeRecord::new(
            decimal_input(self.fees_earned, "fees_earned")?,
            decimal_input(self.days_held, "days_held")?,
        )?;
        Ok((position, movement, fees))
    }
}

/// Position-based calculation output.
#[derive(Debug, Clone, Serialize)]
pub struct CalculateResponse {
    pub il_percentage: Decimal,
    pub il_usd: Decimal,
    pub initial_value_usd: Decimal,
    pub current_value_usd: Decimal,
    pub hodl_value_usd: Decimal,
    pub fee_apr: Decimal,
    pub net_apr: Decimal,
    pub recommendation: Recommendation,
    pub notes: Vec<String>,
}

impl CalculateResponse {
    #[must_use]
    pub fn from_report(report: IlReport, notes: Vec<String>) -> Self {
        Self {
            il_percentage: report.il_percentage.round_dp(2),
            il_usd: report.il_usd.round_dp(2),
            initial_value_usd: report.initial_value_usd.round_dp(2),
            current_value_usd: report.current_value_usd.round_dp(2),
            hodl_value_usd: report.hodl_value_usd.round_dp(2),
            fee_apr: report.fee_apr.round_dp(2),
            net_apr: report.net_apr.round_dp(2),
            recommendation: report.recommendation,
            notes,
        }
    }
}

/// Pool-based estimation input.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateRequest {
    pub pool_address: String,
    pub chain: u64,
    #[serde(default = "default_window_hours")]
    pub window_hours: f64,
    /// Pool family; defaults to uniswap-v2 (auto-detection is out of scope).
    #[serde(default)]
    pub pool_type: Option<String>,
    /// Weight distribution, any scale (`[50, 50]`, `[80, 20]`).
    #[serde(default)]
    pub token_weights: Option<Vec<f64>>,
    /// Token amounts for a simulated deposit.
    #[serde(default)]
    pub deposit_amounts: Option<Vec<f64>>,
}

fn default_window_hours() -> f64 {
    24.0
}

impl EstimateRequest {
    pub fn pool_kind(&self) -> DomainResult<PoolKind> {
        match &self.pool_type {
            None => Ok(PoolKind::UniswapV2),
            Some(s) => PoolKind::from_str(s).ok_or_else(|| {
                lp_il_domain::DomainError::unsupported(format!("unknown pool type '{s}'"))
            }),
        }
    }

    pub fn weights(&self) -> DomainResult<Option<Vec<Decimal>>> {
        self.token_weights
            .as_ref()
            .map(|ws| {
                ws.iter()
                    .map(|w| decimal_input(*w, "token_weights"))
                    .collect()
            })
            .transpose()
    }
}

/// Pool metadata echoed back with the estimate.
#[derive(Debug, Clone, Serialize)]
pub struct PoolInfo {
    #[serde(rename = "type")]
    pub kind: PoolKind,
    pub token0: String,
    pub token1: String,
    pub fee_tier_percent: Decimal,
    pub tvl_usd: Decimal,
}

/// Pool-based estimation output.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateResponse {
    #[serde(rename = "IL_percent")]
    pub il_percent: Decimal,
    pub fee_apr_est: Decimal,
    pub volume_window: Decimal,
    pub pool_info: PoolInfo,
    pub price_changes: BTreeMap<String, Decimal>,
    pub notes: Vec<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub supported_chains: Vec<u64>,
    pub free_mode: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn calculate_request() -> CalculateRequest {
        CalculateRequest {
            initial_price_0: 2000.0,
            initial_price_1: 1.0,
            current_price_ratio: 1.5,
            amount_0: 1.0,
            amount_1: 1.0,
            fees_earned: 10.0,
            days_held: 30.0,
        }
    }

    #[test]
    fn test_to_domain_happy_path() {
        let (position, movement, fees) = calculate_request().to_domain().unwrap();
        assert_eq!(position.initial_value_usd(), dec!(2001));
        assert_eq!(movement.ratio(), dec!(1.5));
        assert_eq!(fees.days_held(), dec!(30));
    }

    #[test]
    fn test_to_domain_rejects_nan_and_zero_days() {
        let mut bad = calculate_request();
        bad.current_price_ratio = f64::NAN;
        assert!(bad.to_domain().is_err());

        let mut bad = calculate_request();
        bad.days_held = 0.0;
        assert!(bad.to_domain().is_err());

        let mut bad = calculate_request();
        bad.current_price_ratio = -2.0;
        assert!(bad.to_domain().is_err());
    }

    #[test]
    fn test_estimate_request_pool_kind() {
        let request: EstimateRequest = serde_json::from_str(
            r#"{"pool_address": "0xabc", "chain": 1, "pool_type": "balancer-weighted"}"#,
        )
        .unwrap();
        assert_eq!(request.pool_kind().unwrap(), PoolKind::BalancerWeighted);
        assert_eq!(request.window_hours, 24.0);

        let unknown: EstimateRequest =
            serde_json::from_str(r#"{"pool_address": "0xabc", "chain": 1, "pool_type": "dodo"}"#)
                .unwrap();
        assert!(unknown.pool_kind().is_err());
    }

    #[test]
    fn test_response_rounding() {
        let request = calculate_request();
        let (position, movement, fees) = request.to_domain().unwrap();
        let report = lp_il_domain::metrics::impermanent_loss::constant_product_report(
            &position, &movement, &fees,
        )
        .unwrap();
        let response = CalculateResponse::from_report(report, vec![]);
        assert_eq!(response.il_percentage, dec!(-18.34));
        assert_eq!(response.hodl_value_usd, dec!(3001));
    }
}
