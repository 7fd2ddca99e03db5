//! Data collaborators for the LP impermanent loss estimator.
//!
//! Everything here talks to the outside world so the calculation core never
//! has to: chain RPC endpoints, pool contract reads, and USD price lookups.
//! The [`analyzer::PoolAnalyzer`] ties them together, resolving a pool
//! address into the `PoolContext` + price ratios the domain crate consumes.

/// Pool analysis orchestration.
pub mod analyzer;
/// Chain id to RPC endpoint registry.
pub mod chains;
/// CoinGecko price source.
pub mod coingecko;
/// Error types.
pub mod error;
/// Minimal EVM JSON-RPC pool reader.
pub mod rpc;

pub use analyzer::{DataQuality, PoolAnalysis, PoolAnalyzer, PoolSource, PriceSource};
pub use chains::{ChainEndpoint, ChainRegistry};
pub use coingecko::CoinGeckoClient;
pub use error::{DataError, DataResult};
pub use rpc::{EvmPoolReader, PoolTokens, TokenInfo};
