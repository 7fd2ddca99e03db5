use crate::error::ApiResult;
use crate::models::{
    CalculateRequest, CalculateResponse, EstimateRequest, EstimateResponse, HealthResponse,
    PoolInfo,
};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use lp_il_data::{CoinGeckoClient, DataQuality, EvmPoolReader, PoolAnalysis, PoolAnalyzer};
use lp_il_domain::metrics::{fees, impermanent_loss};
use lp_il_domain::position::decimal_input;
use lp_il_domain::{DomainError, PoolKind};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>LP Impermanent Loss Estimator</title></head>
<body>
  <h1>LP Impermanent Loss Estimator</h1>
  <p>Calculate impermanent loss and fee APR for LP positions across major AMMs.</p>
  <ul>
    <li><code>POST /lp/estimate</code> - pool-based estimate (address + chain)</li>
    <li><code>POST /lp/calculate</code> - position-based calculation (explicit amounts)</li>
    <li><code>GET /health</code> - operational status</li>
    <li><code>GET /.well-known/x402</code> - payment manifest</li>
  </ul>
</body>
</html>
"#;

pub async fn landing() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "LP Impermanent Loss Estimator",
        supported_chains: state.chains.supported_ids(),
        free_mode: state.payment.free_mode,
    })
}

/// x402 protocol metadata; the 402 status is part of the protocol.
pub async fn x402_metadata(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::PAYMENT_REQUIRED,
        Json(state.payment.x402_manifest()),
    )
}

/// AP2 agent card.
pub async fn agent_metadata(State(state): State<AppState>) -> Json<Value> {
    Json(state.payment.agent_card())
}

/// Discovery GET on the entrypoint always answers 402 with the manifest.
pub async fn entrypoint_manifest(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    x402_metadata(State(state)).await
}

/// Paid POST entrypoint; same computation as `/lp/estimate`.
pub async fn entrypoint_invoke(
    State(state): State<AppState>,
    Json(request): Json<EstimateRequest>,
) -> ApiResult<Json<EstimateResponse>> {
    estimate(State(state), Json(request)).await
}

/// Position-based calculation: no external data, pure formula evaluation.
pub async fn calculate(
    Json(request): Json<CalculateRequest>,
) -> ApiResult<Json<CalculateResponse>> {
    let (position, movement, fee_record) = request.to_domain()?;
    let report = impermanent_loss::constant_product_report(&position, &movement, &fee_record)?;

    let mut notes = Vec::new();
    if fee_record.is_short_window() {
        notes.push(
            "Position held under one day - annualized figures amplify extrapolation error"
                .to_string(),
        );
    }

    info!(
        il_percentage = %report.il_percentage,
        fee_apr = %report.fee_apr,
        recommendation = %report.recommendation,
        "position calculated"
    );

    Ok(Json(CalculateResponse::from_report(report, notes)))
}

/// Pool-based estimate: resolve pool data, then run the same core.
pub async fn estimate(
    State(state): State<AppState>,
    Json(request): Json<EstimateRequest>,
) -> ApiResult<Json<EstimateResponse>> {
    let pool_kind = request.pool_kind()?;
    let weights = request.weights()?;
    let window_hours = decimal_input(request.window_hours, "window_hours")?;
    if window_hours <= Decimal::ZERO {
        return Err(DomainError::invalid("window_hours must be strictly positive").into());
    }

    info!(
        pool = %request.pool_address,
        chain = request.chain,
        window = %window_hours,
        kind = pool_kind.as_str(),
        "estimate requested"
    );

    let endpoint = state.chains.endpoint(request.chain)?;
    let reader = EvmPoolReader::new(state.http.clone(), endpoint.rpc_url.clone());
    let prices = CoinGeckoClient::new(state.http.clone());
    let analyzer = PoolAnalyzer::new(reader, prices, endpoint);

    let analysis = analyzer
        .analyze(&request.pool_address, window_hours, pool_kind, weights)
        .await?;

    build_estimate_response(&analysis, window_hours, request.deposit_amounts.as_deref())
        .map(Json)
}

/// Turns a resolved analysis into the response, including the note rules
/// the service has always applied.
fn build_estimate_response(
    analysis: &PoolAnalysis,
    window_hours: Decimal,
    deposit_amounts: Option<&[f64]>,
) -> ApiResult<EstimateResponse> {
    let context = &analysis.context;
    let ratios = [analysis.price_ratio0, analysis.price_ratio1];

    let (il_percent, fallback_note) =
        impermanent_loss::pool_il_percent_or_approximation(context, &ratios)?;
    let fee_apr = fees::pool_fee_apr(
        context.volume_window_usd,
        context.fee_rate,
        context.tvl_usd,
        window_hours,
    )?;

    let mut notes = Vec::new();
    if il_percent.abs() < Decimal::ONE {
        notes.push("Minimal impermanent loss detected (<1%)".to_string());
    } else if il_percent.abs() > Decimal::TEN {
        notes.push(
            "WARNING: High impermanent loss (>10%). Consider if fee APR compensates.".to_string(),
        );
    }
    if fee_apr > il_percent.abs() {
        notes.push("Fee earnings exceed impermanent loss - net positive position".to_string());
    } else {
        notes.push("Fee earnings do not fully compensate for impermanent loss".to_string());
    }
    if analysis.data_quality == DataQuality::Limited {
        notes.push("Limited historical data available - estimates may be less accurate".to_string());
    }
    notes.push("Volume estimated from TVL turnover; no indexer data in the loop".to_string());
    if window_hours < Decimal::ONE {
        notes.push(
            "Observation window under one hour - annualized figures amplify extrapolation error"
                .to_string(),
        );
    }
    if let Some(note) = fallback_note {
        notes.push(note.to_string());
    }
    match context.pool_kind {
        PoolKind::CurveStable => {
            notes.push("Curve stablecoin pool - IL typically minimal".to_string());
        }
        PoolKind::BalancerWeighted => {
            notes.push(format!(
                "Balancer weighted pool - weights: {:?}",
                context.token_weights
            ));
        }
        PoolKind::UniswapV3 => {
            notes.push(
                "Uniswap V3 concentrated liquidity - IL can be higher if price moves out of range"
                    .to_string(),
            );
        }
        _ => {}
    }

    if let Some(amounts) = deposit_amounts {
        notes.push(simulated_deposit_note(analysis, window_hours, amounts)?);
    }

    let mut price_changes = BTreeMap::new();
    price_changes.insert(analysis.token0.symbol.clone(), analysis.price_ratio0.round_dp(2));
    price_changes.insert(analysis.token1.symbol.clone(), analysis.price_ratio1.round_dp(2));

    Ok(EstimateResponse {
        il_percent: il_percent.round_dp(2),
        fee_apr_est: fee_apr.round_dp(2),
        volume_window: context.volume_window_usd.round_dp(2),
        pool_info: PoolInfo {
            kind: context.pool_kind,
            token0: analysis.token0.symbol.clone(),
            token1: analysis.token1.symbol.clone(),
            fee_tier_percent: context.fee_tier_percent().round_dp(2),
            tvl_usd: context.tvl_usd.round_dp(2),
        },
        price_changes,
        notes,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

/// Projects fee earnings for a simulated deposit at current prices.
fn simulated_deposit_note(
    analysis: &PoolAnalysis,
    window_hours: Decimal,
    amounts: &[f64],
) -> ApiResult<String> {
    if amounts.len() != 2 {
        return Err(
            DomainError::invalid("deposit_amounts must list exactly two token amounts").into(),
        );
    }
    let amount0 = decimal_input(amounts[0], "deposit_amounts")?;
    let amount1 = decimal_input(amounts[1], "deposit_amounts")?;
    let position_size =
        amount0 * analysis.current_price0 + amount1 * analysis.current_price1;

    let earnings = fees::position_earnings(
        position_size,
        analysis.context.volume_window_usd,
        analysis.context.tvl_usd,
        analysis.context.fee_rate,
        window_hours,
    )?;

    Ok(format!(
        "Simulated deposit worth ${} projects ${}/day in fees ({}% APR)",
        position_size.round_dp(2),
        earnings.earnings_daily_usd.round_dp(2),
        earnings.apr_percent.round_dp(2),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lp_il_data::TokenInfo;
    use lp_il_domain::PoolContext;
    use rust_decimal_macros::dec;

    fn analysis(pool_kind: PoolKind, ratio0: Decimal, ratio1: Decimal) -> PoolAnalysis {
        PoolAnalysis {
            pool_address: "0xpool".to_string(),
            chain_id: 1,
            token0: TokenInfo {
                address: "0xweth".to_string(),
                symbol: "WETH".to_string(),
                decimals: 18,
            },
            token1: TokenInfo {
                address: "0xusdc".to_string(),
                symbol: "USDC".to_string(),
                decimals: 6,
            },
            context: PoolContext::new(pool_kind, dec!(10000000), dec!(1000000)),
            initial_price0: dec!(2000),
            initial_price1: dec!(1),
            current_price0: dec!(2000) * ratio0,
            current_price1: ratio1,
            price_ratio0: ratio0,
            price_ratio1: ratio1,
            window_hours: dec!(24),
            data_quality: DataQuality::Estimated,
        }
    }

    #[test]
    fn test_estimate_response_flat_market() {
        let response =
            build_estimate_response(&analysis(PoolKind::UniswapV2, dec!(1), dec!(1)), dec!(24), None)
                .unwrap();
        assert_eq!(response.il_percent, dec!(0.00));
        assert!(response
            .notes
            .iter()
            .any(|n| n.contains("Minimal impermanent loss")));
        assert_eq!(response.price_changes["WETH"], dec!(1.00));
        // 1M volume at 0.3% over 10M TVL, 24h window -> 10.95% APR
        assert_eq!(response.fee_apr_est, dec!(10.95));
    }

    #[test]
    fn test_estimate_response_high_il_warns() {
        // token0 4x while token1 flat: IL exceeds 10%
        let response =
            build_estimate_response(&analysis(PoolKind::UniswapV2, dec!(4), dec!(1)), dec!(24), None)
                .unwrap();
        assert!(response.il_percent < dec!(-10));
        assert!(response.notes.iter().any(|n| n.contains("WARNING")));
    }

    #[test]
    fn test_estimate_response_stable_fallback_noted() {
        let response = build_estimate_response(
            &analysis(PoolKind::CurveStable, dec!(1.01), dec!(1)),
            dec!(24),
            None,
        )
        .unwrap();
        assert!(response.notes.iter().any(|n| n.contains("constant-product")));
        assert!(response
            .notes
            .iter()
            .any(|n| n.contains("Curve stablecoin pool")));
    }

    #[test]
    fn test_estimate_response_deposit_projection() {
        let response = build_estimate_response(
            &analysis(PoolKind::UniswapV2, dec!(1), dec!(1)),
            dec!(24),
            Some(&[1.0, 2000.0]),
        )
        .unwrap();
        assert!(response
            .notes
            .iter()
            .any(|n| n.contains("Simulated deposit")));
    }

    #[test]
    fn test_estimate_response_short_window_flagged() {
        let response = build_estimate_response(
            &analysis(PoolKind::UniswapV2, dec!(1), dec!(1)),
            dec!(0.5),
            None,
        )
        .unwrap();
        assert!(response
            .notes
            .iter()
            .any(|n| n.contains("Observation window under one hour")));
    }

    #[test]
    fn test_deposit_note_rejects_wrong_arity() {
        let result = build_estimate_response(
            &analysis(PoolKind::UniswapV2, dec!(1), dec!(1)),
            dec!(24),
            Some(&[1.0]),
        );
        assert!(result.is_err());
    }
}
