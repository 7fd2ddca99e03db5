//! Core calculation domain for the LP impermanent loss estimator.
//!
//! Everything in this crate is a pure, synchronous function of its inputs:
//! - Validated value records for positions, price movements and fee history
//! - Constant-product and weighted-pool invariant math
//! - Impermanent loss, fee APR and net position metrics
//! - The recommendation classifier
//!
//! No I/O, no shared state. Data fetching lives in `lp-il-data`, transport
//! in `lp-il-api`.

/// Domain error types.
pub mod error;
/// Pool kind variants.
pub mod enums;
/// Invariant math (constant product, weighted).
pub mod math;
/// IL, fee APR and recommendation metrics.
pub mod metrics;
/// Pool context consumed from the data layer.
pub mod pool;
/// Validated position value records.
pub mod position;

pub use enums::PoolKind;
pub use error::{DomainError, DomainResult};
pub use metrics::recommendation::Recommendation;
pub use metrics::IlReport;
pub use pool::PoolContext;
pub use position::{FeeRecord, Position, PriceMovement};
