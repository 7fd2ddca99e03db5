use crate::error::{DataError, DataResult};

/// One supported chain: its id, a JSON-RPC endpoint, and the CoinGecko
/// platform slug used for token price lookups.
#[derive(Debug, Clone)]
pub struct ChainEndpoint {
    pub chain_id: u64,
    pub name: &'static str,
    pub rpc_url: String,
    pub coingecko_platform: &'static str,
}

/// Registry of chain endpoints.
///
/// Defaults cover the public llamarpc gateways; each can be overridden
/// through its `*_RPC_URL` environment variable (e.g. `ETHEREUM_RPC_URL`).
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: Vec<ChainEndpoint>,
}

/// (chain id, name, env var, default RPC, coingecko platform)
const DEFAULTS: &[(u64, &str, &str, &str, &str)] = &[
    (1, "ethereum", "ETHEREUM_RPC_URL", "https://eth.llamarpc.com", "ethereum"),
    (137, "polygon", "POLYGON_RPC_URL", "https://polygon.llamarpc.com", "polygon-pos"),
    (42161, "arbitrum", "ARBITRUM_RPC_URL", "https://arbitrum.llamarpc.com", "arbitrum-one"),
    (10, "optimism", "OPTIMISM_RPC_URL", "https://optimism.llamarpc.com", "optimistic-ethereum"),
    (8453, "base", "BASE_RPC_URL", "https://base.llamarpc.com", "base"),
    (56, "bsc", "BSC_RPC_URL", "https://bsc.llamarpc.com", "binance-smart-chain"),
    (43114, "avalanche", "AVALANCHE_RPC_URL", "https://avalanche.llamarpc.com", "avalanche"),
];

impl ChainRegistry {
    /// Builds the registry from defaults plus environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        let chains = DEFAULTS
            .iter()
            .map(|&(chain_id, name, env_var, default_url, platform)| ChainEndpoint {
                chain_id,
                name,
                rpc_url: std::env::var(env_var).unwrap_or_else(|_| default_url.to_string()),
                coingecko_platform: platform,
            })
            .collect();
        Self { chains }
    }

    /// Looks up a chain by id.
    ///
    /// # Errors
    /// `UnsupportedChain` when no endpoint is configured for the id.
    pub fn endpoint(&self, chain_id: u64) -> DataResult<&ChainEndpoint> {
        self.chains
            .iter()
            .find(|c| c.chain_id == chain_id)
            .ok_or(DataError::UnsupportedChain(chain_id))
    }

    /// Ids of every supported chain, for the health endpoint.
    #[must_use]
    pub fn supported_ids(&self) -> Vec<u64> {
        self.chains.iter().map(|c| c.chain_id).collect()
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_chains() {
        let registry = ChainRegistry::from_env();
        assert_eq!(registry.endpoint(1).unwrap().name, "ethereum");
        assert_eq!(registry.endpoint(8453).unwrap().coingecko_platform, "base");
        assert_eq!(registry.supported_ids().len(), 7);
    }

    #[test]
    fn test_unknown_chain_rejected() {
        let registry = ChainRegistry::from_env();
        assert!(matches!(
            registry.endpoint(999),
            Err(DataError::UnsupportedChain(999))
        ));
    }
}
