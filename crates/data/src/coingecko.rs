//! CoinGecko price source (free tier).
//!
//! Spot prices come from `simple/token_price`; historical points from the
//! contract `market_chart` endpoint, picking the sample closest to the
//! requested age. Both return `None` rather than erroring when CoinGecko
//! simply does not know the token, so the analyzer can decide how to
//! degrade.

use crate::analyzer::PriceSource;
use crate::error::{DataError, DataResult};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SpotEntry {
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MarketChart {
    /// `[timestamp_ms, price]` pairs.
    #[serde(default)]
    prices: Vec<(f64, f64)>,
}

impl CoinGeckoClient {
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL)
    }

    #[must_use]
    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn to_decimal(price: f64) -> DataResult<Decimal> {
        Decimal::from_f64(price)
            .ok_or_else(|| DataError::PriceSource(format!("non-finite price {price}")))
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn spot_price_usd(
        &self,
        platform: &str,
        token_address: &str,
    ) -> DataResult<Option<Decimal>> {
        let url = format!("{}/simple/token_price/{}", self.base_url, platform);
        let address = token_address.to_lowercase();

        debug!(platform = %platform, token = %address, "fetching spot price");
        let response: HashMap<String, SpotEntry> = self
            .http
            .get(&url)
            .query(&[("contract_addresses", address.as_str()), ("vs_currencies", "usd")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .get(&address)
            .and_then(|entry| entry.usd)
            .map(Self::to_decimal)
            .transpose()
    }

    async fn historical_price_usd(
        &self,
        platform: &str,
        token_address: &str,
        hours_ago: u32,
    ) -> DataResult<Option<Decimal>> {
        let address = token_address.to_lowercase();
        let url = format!(
            "{}/coins/{}/contract/{}/market_chart",
            self.base_url, platform, address
        );
        // market_chart resolution is daily below 1 day of range
        let days = (f64::from(hours_ago) / 24.0).max(1.0).to_string();

        debug!(platform = %platform, token = %address, hours_ago, "fetching historical price");
        let chart: MarketChart = self
            .http
            .get(&url)
            .query(&[("vs_currency", "usd"), ("days", days.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if chart.prices.is_empty() {
            return Ok(None);
        }

        let target_ms = (Utc::now().timestamp_millis() as f64) - f64::from(hours_ago) * 3_600_000.0;
        let closest = chart
            .prices
            .iter()
            .min_by(|a, b| {
                let da = (a.0 - target_ms).abs();
                let db = (b.0 - target_ms).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(_, price)| *price);

        closest.map(Self::to_decimal).transpose()
    }
}
