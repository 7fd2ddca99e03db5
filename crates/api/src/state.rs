use crate::payment::PaymentConfig;
use lp_il_data::ChainRegistry;
use std::sync::Arc;

/// Shared application state. Everything here is configuration or a cheap
/// clone; per-request collaborators (pool readers, analyzers) are built in
/// the handlers from these pieces.
#[derive(Clone)]
pub struct AppState {
    pub payment: Arc<PaymentConfig>,
    pub chains: Arc<ChainRegistry>,
    pub http: reqwest::Client,
}

impl AppState {
    #[must_use]
    pub fn new(payment: PaymentConfig, chains: ChainRegistry) -> Self {
        Self {
            payment: Arc::new(payment),
            chains: Arc::new(chains),
            http: reqwest::Client::new(),
        }
    }

    /// State assembled entirely from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(PaymentConfig::from_env(), ChainRegistry::from_env())
    }
}
