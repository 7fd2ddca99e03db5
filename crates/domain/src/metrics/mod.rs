use rust_decimal::Decimal;
use serde::Serialize;

pub mod fees;
pub mod impermanent_loss;
pub mod recommendation;

use self::recommendation::Recommendation;

/// Full impermanent-loss breakdown for one position, built fresh per
/// request and never stored.
#[derive(Debug, Clone, Serialize)]
pub struct IlReport {
    /// IL relative to holding, as a percentage (negative = loss).
    pub il_percentage: Decimal,
    /// IL in USD (current pre-fee value minus hold value).
    pub il_usd: Decimal,
    /// USD value of the deposit at entry.
    pub initial_value_usd: Decimal,
    /// Current position value including fees earned.
    pub current_value_usd: Decimal,
    /// What the deposit would be worth if simply held.
    pub hodl_value_usd: Decimal,
    /// Annualized fee yield, percent.
    pub fee_apr: Decimal,
    /// Fee APR plus annualized IL, percent.
    pub net_apr: Decimal,
    pub recommendation: Recommendation,
}
