//! Minimal EVM JSON-RPC pool reader.
//!
//! Talks directly to `eth_call` with hardcoded function selectors instead of
//! carrying a full ABI stack; the estimator only ever needs five read-only
//! views: `token0()`, `token1()`, `getReserves()`, `fee()`, plus ERC-20
//! `symbol()`/`decimals()`.

use crate::analyzer::PoolSource;
use crate::error::{DataError, DataResult};
use async_trait::async_trait;
use lp_il_domain::PoolKind;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

// keccak-256 selectors for the read-only views above
const SEL_TOKEN0: &str = "0x0dfe1681";
const SEL_TOKEN1: &str = "0xd21220a7";
const SEL_GET_RESERVES: &str = "0x0902f1ac";
const SEL_FEE: &str = "0xddca3f43";
const SEL_SYMBOL: &str = "0x95d89b41";
const SEL_DECIMALS: &str = "0x313ce567";

const HEX_WORD: usize = 64;

/// Token metadata read from the chain.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TokenInfo {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

/// The two tokens backing a pool.
#[derive(Debug, Clone)]
pub struct PoolTokens {
    pub token0: TokenInfo,
    pub token1: TokenInfo,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// JSON-RPC client bound to one chain endpoint, created per request the
/// same way the analyzer is.
#[derive(Debug, Clone)]
pub struct EvmPoolReader {
    http: reqwest::Client,
    rpc_url: String,
}

impl EvmPoolReader {
    #[must_use]
    pub fn new(http: reqwest::Client, rpc_url: impl Into<String>) -> Self {
        Self {
            http,
            rpc_url: rpc_url.into(),
        }
    }

    async fn eth_call(&self, to: &str, data: &str) -> DataResult<String> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [{ "to": to, "data": data }, "latest"],
        });

        debug!(to = %to, data = %data, "eth_call");
        let response: RpcResponse = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(DataError::Rpc(format!(
                "eth_call failed ({}): {}",
                err.code, err.message
            )));
        }
        response
            .result
            .filter(|r| r.len() > 2)
            .ok_or_else(|| DataError::Rpc("eth_call returned empty data".to_string()))
    }

    /// ERC-20 symbol and decimals, defaulting to `UNKNOWN`/18 when the
    /// token misbehaves (plenty do), so one odd token cannot sink the
    /// whole analysis.
    async fn token_info(&self, address: &str) -> TokenInfo {
        let symbol = match self.eth_call(address, SEL_SYMBOL).await {
            Ok(data) => decode_abi_string(&data).unwrap_or_else(|_| "UNKNOWN".to_string()),
            Err(e) => {
                warn!(token = %address, error = %e, "symbol() call failed, defaulting");
                "UNKNOWN".to_string()
            }
        };
        let decimals = match self.eth_call(address, SEL_DECIMALS).await {
            Ok(data) => word(&data, 0)
                .and_then(decode_u128)
                .map_or(18, |d| d.min(255) as u8),
            Err(e) => {
                warn!(token = %address, error = %e, "decimals() call failed, defaulting to 18");
                18
            }
        };
        TokenInfo {
            address: address.to_string(),
            symbol,
            decimals,
        }
    }
}

#[async_trait]
impl PoolSource for EvmPoolReader {
    async fn pool_tokens(&self, pool_address: &str) -> DataResult<PoolTokens> {
        let token0_addr = decode_address(&self.eth_call(pool_address, SEL_TOKEN0).await?)?;
        let token1_addr = decode_address(&self.eth_call(pool_address, SEL_TOKEN1).await?)?;

        let token0 = self.token_info(&token0_addr).await;
        let token1 = self.token_info(&token1_addr).await;

        Ok(PoolTokens { token0, token1 })
    }

    async fn reserves(
        &self,
        pool_address: &str,
        token0: &TokenInfo,
        token1: &TokenInfo,
    ) -> DataResult<(Decimal, Decimal)> {
        let data = self.eth_call(pool_address, SEL_GET_RESERVES).await?;
        let reserve0 = decode_u128(word(&data, 0)?)?;
        let reserve1 = decode_u128(word(&data, 1)?)?;

        Ok((
            scaled_amount(reserve0, token0.decimals)?,
            scaled_amount(reserve1, token1.decimals)?,
        ))
    }

    async fn fee_rate(&self, pool_address: &str, kind: PoolKind) -> DataResult<Decimal> {
        if kind != PoolKind::UniswapV3 {
            return Ok(kind.default_fee_rate());
        }
        // V3 stores the fee in hundredths of a bip
        match self.eth_call(pool_address, SEL_FEE).await {
            Ok(data) => {
                let raw = decode_u128(word(&data, 0)?)?;
                Ok(Decimal::from(raw as u64) / Decimal::from(1_000_000))
            }
            Err(e) => {
                warn!(pool = %pool_address, error = %e, "fee() call failed, using default tier");
                Ok(kind.default_fee_rate())
            }
        }
    }
}

fn strip_0x(data: &str) -> &str {
    data.strip_prefix("0x").unwrap_or(data)
}

/// The `index`-th 32-byte word of the return data, as hex.
fn word(data: &str, index: usize) -> DataResult<&str> {
    let hex = strip_0x(data);
    let start = index * HEX_WORD;
    hex.get(start..start + HEX_WORD)
        .ok_or_else(|| DataError::Rpc(format!("return data shorter than word {index}")))
}

/// An address is the low 20 bytes of a 32-byte word.
fn decode_address(data: &str) -> DataResult<String> {
    let w = word(data, 0)?;
    Ok(format!("0x{}", &w[HEX_WORD - 40..]))
}

fn decode_u128(hex_word: &str) -> DataResult<u128> {
    // uint112 reserves and uint24 fees both fit well inside the low 16 bytes
    let trimmed = hex_word.trim_start_matches('0');
    if trimmed.len() > 32 {
        return Err(DataError::Rpc("uint value exceeds 128 bits".to_string()));
    }
    if trimmed.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(trimmed, 16)
        .map_err(|e| DataError::Rpc(format!("bad uint in return data: {e}")))
}

/// Standard ABI dynamic string: offset word, length word, then bytes.
/// Some legacy tokens return a bare bytes32 instead; handle both.
fn decode_abi_string(data: &str) -> DataResult<String> {
    let hex = strip_0x(data);
    let bytes = if hex.len() >= 3 * HEX_WORD {
        let len = decode_u128(word(data, 1)?)? as usize;
        let payload = hex
            .get(2 * HEX_WORD..)
            .ok_or_else(|| DataError::Rpc("truncated string data".to_string()))?;
        hex_to_bytes(payload)?
            .into_iter()
            .take(len)
            .collect::<Vec<u8>>()
    } else {
        // bytes32 symbol, null padded
        hex_to_bytes(word(data, 0)?)?
            .into_iter()
            .take_while(|b| *b != 0)
            .collect()
    };

    String::from_utf8(bytes).map_err(|_| DataError::Rpc("symbol is not UTF-8".to_string()))
}

fn hex_to_bytes(hex: &str) -> DataResult<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return Err(DataError::Rpc("odd-length hex data".to_string()));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| DataError::Rpc(format!("bad hex in return data: {e}")))
        })
        .collect()
}

/// Raw integer amount scaled down by the token's decimals.
fn scaled_amount(raw: u128, decimals: u8) -> DataResult<Decimal> {
    let value = Decimal::from_u128(raw)
        .ok_or_else(|| DataError::Rpc("reserve exceeds numeric range".to_string()))?;
    let divisor = Decimal::from_u128(10u128.pow(u32::from(decimals.min(28))))
        .ok_or_else(|| DataError::Rpc("decimals out of range".to_string()))?;
    Ok(value / divisor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decode_address() {
        let data = "0x000000000000000000000000c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
        assert_eq!(
            decode_address(data).unwrap(),
            "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
        );
    }

    #[test]
    fn test_decode_u128() {
        assert_eq!(decode_u128(&"0".repeat(64)).unwrap(), 0);
        let mut word = "0".repeat(64);
        word.replace_range(60..64, "0bb8");
        assert_eq!(decode_u128(&word).unwrap(), 3000);
    }

    #[test]
    fn test_decode_reserves_words() {
        // getReserves returns three words; only the first two matter
        let data = format!(
            "0x{:064x}{:064x}{:064x}",
            5_000_000_000_000_000_000u128, // 5e18
            12_000_000_000u128,            // 12e9
            1_700_000_000u64
        );
        assert_eq!(decode_u128(word(&data, 0).unwrap()).unwrap(), 5_000_000_000_000_000_000);
        assert_eq!(decode_u128(word(&data, 1).unwrap()).unwrap(), 12_000_000_000);
    }

    #[test]
    fn test_decode_abi_dynamic_string() {
        // offset 0x20, length 4, "WETH"
        let data = format!(
            "0x{:064x}{:064x}{}",
            0x20,
            4,
            format!("{:0<64}", "57455448")
        );
        assert_eq!(decode_abi_string(&data).unwrap(), "WETH");
    }

    #[test]
    fn test_decode_bytes32_symbol() {
        // legacy tokens (MKR-style) return bytes32: "MKR" null-padded
        let data = format!("0x{:0<64}", "4d4b52");
        assert_eq!(decode_abi_string(&data).unwrap(), "MKR");
    }

    #[test]
    fn test_scaled_amount() {
        assert_eq!(
            scaled_amount(5_000_000_000_000_000_000, 18).unwrap(),
            dec!(5)
        );
        assert_eq!(scaled_amount(12_500_000, 6).unwrap(), dec!(12.5));
    }
}
