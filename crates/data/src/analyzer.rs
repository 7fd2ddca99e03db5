//! Pool analysis orchestration.
//!
//! `PoolAnalyzer` resolves everything the calculation core needs for a
//! pool-based estimate: token metadata, spot and historical prices, TVL,
//! an estimated trading volume, and the fee tier, packed into a
//! `PoolContext` plus per-token price ratios.

use crate::chains::ChainEndpoint;
use crate::error::{DataError, DataResult};
use crate::rpc::{PoolTokens, TokenInfo};
use async_trait::async_trait;
use lp_il_domain::{PoolContext, PoolKind};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

/// On-chain pool reads. Implemented by the JSON-RPC reader; stubbed in
/// tests.
#[async_trait]
pub trait PoolSource: Send + Sync {
    async fn pool_tokens(&self, pool_address: &str) -> DataResult<PoolTokens>;

    /// Reserves normalized by token decimals.
    async fn reserves(
        &self,
        pool_address: &str,
        token0: &TokenInfo,
        token1: &TokenInfo,
    ) -> DataResult<(Decimal, Decimal)>;

    async fn fee_rate(&self, pool_address: &str, kind: PoolKind) -> DataResult<Decimal>;
}

/// USD price lookups. `None` means the source does not know the token.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn spot_price_usd(
        &self,
        platform: &str,
        token_address: &str,
    ) -> DataResult<Option<Decimal>>;

    async fn historical_price_usd(
        &self,
        platform: &str,
        token_address: &str,
        hours_ago: u32,
    ) -> DataResult<Option<Decimal>>;
}

/// How trustworthy the assembled numbers are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    /// Everything resolved, volume still a heuristic.
    Estimated,
    /// Historical prices were missing and fell back to spot.
    Limited,
}

/// Everything the pool-based estimate consumes, resolved and validated.
#[derive(Debug, Clone)]
pub struct PoolAnalysis {
    pub pool_address: String,
    pub chain_id: u64,
    pub token0: TokenInfo,
    pub token1: TokenInfo,
    pub context: PoolContext,
    pub initial_price0: Decimal,
    pub initial_price1: Decimal,
    pub current_price0: Decimal,
    pub current_price1: Decimal,
    /// Current/initial factor per token.
    pub price_ratio0: Decimal,
    pub price_ratio1: Decimal,
    pub window_hours: Decimal,
    pub data_quality: DataQuality,
}

/// Per-request orchestrator, bound to one chain endpoint like its sources.
pub struct PoolAnalyzer<S, P> {
    pool_source: S,
    price_source: P,
    chain_id: u64,
    platform: String,
}

impl<S: PoolSource, P: PriceSource> PoolAnalyzer<S, P> {
    pub fn new(pool_source: S, price_source: P, chain: &ChainEndpoint) -> Self {
        Self {
            pool_source,
            price_source,
            chain_id: chain.chain_id,
            platform: chain.coingecko_platform.to_string(),
        }
    }

    /// Gathers pool data over the trailing window.
    ///
    /// Historical prices degrade to spot (ratio 1.0, quality `Limited`)
    /// rather than failing the request; missing spot prices or reserves are
    /// hard errors since nothing can be valued without them.
    pub async fn analyze(
        &self,
        pool_address: &str,
        window_hours: Decimal,
        pool_kind: PoolKind,
        token_weights: Option<Vec<Decimal>>,
    ) -> DataResult<PoolAnalysis> {
        if window_hours <= Decimal::ZERO {
            return Err(DataError::Domain(lp_il_domain::DomainError::invalid(
                "window must be strictly positive",
            )));
        }
        info!(pool = %pool_address, chain = self.chain_id, window = %window_hours, "analyzing pool");

        let tokens = self.pool_source.pool_tokens(pool_address).await?;

        let current_price0 = self.require_spot(&tokens.token0).await?;
        let current_price1 = self.require_spot(&tokens.token1).await?;

        // price history is hourly at best; sub-hour windows look back 1h
        let lookback_hours = window_hours.to_u32().unwrap_or(1).max(1);

        let mut data_quality = DataQuality::Estimated;
        let initial_price0 = self
            .historical_or_spot(&tokens.token0, lookback_hours, current_price0, &mut data_quality)
            .await?;
        let initial_price1 = self
            .historical_or_spot(&tokens.token1, lookback_hours, current_price1, &mut data_quality)
            .await?;

        let price_ratio0 = ratio(current_price0, initial_price0);
        let price_ratio1 = ratio(current_price1, initial_price1);

        let (reserve0, reserve1) = self
            .pool_source
            .reserves(pool_address, &tokens.token0, &tokens.token1)
            .await?;
        let tvl_usd = reserve0 * current_price0 + reserve1 * current_price1;
        if tvl_usd <= Decimal::ZERO {
            return Err(DataError::MissingData(format!(
                "pool {pool_address} has no valued liquidity"
            )));
        }

        // No indexer in the loop: estimate window volume as one TVL turn
        // per day, scaled to the window. Flagged through data_quality.
        let volume_window_usd = tvl_usd * window_hours / Decimal::from(24);

        let fee_rate = self.pool_source.fee_rate(pool_address, pool_kind).await?;

        let mut context = PoolContext::new(pool_kind, tvl_usd, volume_window_usd)
            .with_fee_rate(fee_rate);
        if let Some(weights) = token_weights {
            context = context.with_weights(weights);
        }

        info!(
            pool = %pool_address,
            token0 = %tokens.token0.symbol,
            token1 = %tokens.token1.symbol,
            tvl = %tvl_usd,
            volume = %volume_window_usd,
            "pool analysis complete"
        );

        Ok(PoolAnalysis {
            pool_address: pool_address.to_string(),
            chain_id: self.chain_id,
            token0: tokens.token0,
            token1: tokens.token1,
            context,
            initial_price0,
            initial_price1,
            current_price0,
            current_price1,
            price_ratio0,
            price_ratio1,
            window_hours,
            data_quality,
        })
    }

    async fn require_spot(&self, token: &TokenInfo) -> DataResult<Decimal> {
        self.price_source
            .spot_price_usd(&self.platform, &token.address)
            .await?
            .ok_or_else(|| {
                DataError::MissingData(format!("no spot price for {}", token.symbol))
            })
    }

    async fn historical_or_spot(
        &self,
        token: &TokenInfo,
        window_hours: u32,
        spot: Decimal,
        data_quality: &mut DataQuality,
    ) -> DataResult<Decimal> {
        match self
            .price_source
            .historical_price_usd(&self.platform, &token.address, window_hours)
            .await
        {
            Ok(Some(price)) if price > Decimal::ZERO => Ok(price),
            Ok(_) => {
                warn!(token = %token.symbol, "historical price unavailable, using spot");
                *data_quality = DataQuality::Limited;
                Ok(spot)
            }
            Err(e) => {
                warn!(token = %token.symbol, error = %e, "historical price lookup failed, using spot");
                *data_quality = DataQuality::Limited;
                Ok(spot)
            }
        }
    }
}

fn ratio(current: Decimal, initial: Decimal) -> Decimal {
    if initial > Decimal::ZERO {
        current / initial
    } else {
        Decimal::ONE
    }
}
