use thiserror::Error;

/// Errors the calculation core can signal.
///
/// `InvalidInput` covers every constructor-time precondition violation:
/// non-finite numbers, negative values where only non-negative are allowed,
/// and zero values where the formulas would divide by zero. Callers get this
/// error synchronously; the core never lets NaN or infinity leak into a
/// result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Input failed validation before any arithmetic ran.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Pool kind or weight configuration the invariant formulas do not cover.
    #[error("unsupported pool configuration: {0}")]
    UnsupportedPool(String),
}

impl DomainError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedPool(msg.into())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
