//! x402 micropayment gate and protocol manifests.
//!
//! The gate checks that a request either runs in free mode or carries a
//! payment header; settlement itself is the facilitator's job, not ours.
//! Unpaid requests get the HTTP 402 manifest that tells an agent how to
//! pay, the same document served from `/.well-known/x402`.

use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// USDC on Base, the settlement asset.
const USDC_BASE_ASSET: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";
/// 0.05 USDC in atomic units.
const PRICE_ATOMIC: &str = "50000";
/// Skill/entrypoint identifier shared across the discovery documents.
pub const ENTRYPOINT_ID: &str = "lp-impermanent-loss-estimator";

/// Payment configuration, environment-driven with workable defaults.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Address fees settle to.
    pub payment_address: String,
    /// Public base URL used in the manifests.
    pub base_url: String,
    /// Facilitators that can settle payments on our behalf.
    pub facilitator_urls: Vec<String>,
    /// Bypass the gate entirely (testing and free launches).
    pub free_mode: bool,
}

impl PaymentConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let free_mode = std::env::var("FREE_MODE")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Self {
            payment_address: std::env::var("PAYMENT_ADDRESS")
                .unwrap_or_else(|_| "0x01D11F7e1a46AbFC6092d7be484895D2d505095c".to_string()),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            facilitator_urls: vec![
                "https://facilitator.daydreams.systems".to_string(),
                "https://api.cdp.coinbase.com/platform/v2/x402/facilitator".to_string(),
            ],
            free_mode,
        }
    }

    fn resource_url(&self) -> String {
        format!("{}/entrypoints/{}/invoke", self.base_url, ENTRYPOINT_ID)
    }

    /// The x402 payment manifest, served with status 402.
    #[must_use]
    pub fn x402_manifest(&self) -> Value {
        json!({
            "x402Version": 1,
            "accepts": [{
                "scheme": "exact",
                "network": "base",
                "maxAmountRequired": PRICE_ATOMIC,
                "resource": self.resource_url(),
                "description": "Calculate impermanent loss and fee APR for LP positions",
                "mimeType": "application/json",
                "payTo": self.payment_address,
                "maxTimeoutSeconds": 30,
                "asset": USDC_BASE_ASSET,
            }],
        })
    }

    /// AP2 agent card served from `/.well-known/agent.json`.
    #[must_use]
    pub fn agent_card(&self) -> Value {
        json!({
            "name": "LP Impermanent Loss Estimator",
            "description": "Calculate IL and fee APR for any LP position or simulated deposit. \
                            Supports Uniswap V2/V3, SushiSwap, Balancer, and Curve across 7 chains.",
            "url": format!("{}/", self.base_url),
            "version": env!("CARGO_PKG_VERSION"),
            "defaultInputModes": ["application/json"],
            "defaultOutputModes": ["application/json"],
            "skills": [{
                "id": ENTRYPOINT_ID,
                "name": ENTRYPOINT_ID,
                "description": "Calculate impermanent loss and fee APR for LP positions",
                "inputModes": ["application/json"],
                "outputModes": ["application/json"],
                "streaming": false,
            }],
            "entrypoints": {
                "lp-impermanent-loss-estimator": {
                    "description": "Calculate IL and fee APR for LP positions",
                    "streaming": false,
                    "pricing": { "invoke": "0.05 USDC" },
                }
            },
            "payments": [{
                "method": "x402",
                "payee": self.payment_address,
                "network": "base",
                "endpoint": self.facilitator_urls.first(),
                "priceModel": { "default": "0.05" },
            }],
        })
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Pulls the payment proof out of the request headers. Either the x402
/// `X-Payment` envelope or a bare settlement hash is accepted.
pub fn extract_payment(headers: &HeaderMap) -> Option<String> {
    for name in ["X-Payment", "X-Payment-TxHash"] {
        if let Some(value) = headers.get(name)
            && let Ok(s) = value.to_str()
            && !s.trim().is_empty()
        {
            return Some(s.trim().to_string());
        }
    }
    None
}

/// Middleware guarding the paid endpoints.
pub async fn payment_gate(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if state.payment.free_mode {
        debug!("free mode active, skipping payment gate");
        return next.run(request).await;
    }

    match extract_payment(request.headers()) {
        Some(proof) => {
            // settlement verification is delegated to the facilitator
            debug!(proof_len = proof.len(), "payment header accepted");
            next.run(request).await
        }
        None => {
            warn!(path = %request.uri().path(), "unpaid request rejected");
            (
                StatusCode::PAYMENT_REQUIRED,
                Json(state.payment.x402_manifest()),
            )
                .into_response()
        }
    }
}
