use lp_il_domain::DomainError;
use thiserror::Error;

/// Failures in the collaborator layer. These map to 5xx at the HTTP
/// boundary; domain validation failures pass through as their own kind.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no RPC endpoint configured for chain {0}")]
    UnsupportedChain(u64),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("price source error: {0}")]
    PriceSource(String),

    #[error("missing data: {0}")]
    MissingData(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type DataResult<T> = Result<T, DataError>;
