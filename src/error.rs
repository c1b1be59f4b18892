use thiserror::Error;

use crate::model::{Assets, Units};
use crate::validate::ValidationError;

/// Errors returned by pool operations.
///
/// Every variant is reported before the operation is allowed to leave a trace:
/// a pool operation that returns `Err` has had its ledger mutations rolled back.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("invalid configuration: {}", join(.0))]
    Configuration(Vec<ValidationError>),

    #[error("{operation} called with a zero amount")]
    ZeroAmount { operation: &'static str },

    #[error("`{field}` must be a non-empty identity")]
    InvalidIdentity { field: &'static str },

    #[error("donation holder `{holder}` cannot receive units from {operation}")]
    DonationHolderReserved {
        holder: String,
        operation: &'static str,
    },

    #[error("holder `{holder}` owns {available} units, {required} required")]
    InsufficientUnits {
        holder: String,
        required: Units,
        available: Units,
    },

    #[error("insufficient liquidity: {requested} assets requested, only {available} could be freed")]
    InsufficientLiquidity { requested: Assets, available: Assets },

    #[error("strategy `{strategy}` failed: {reason}")]
    AdapterFailure { strategy: String, reason: String },

    #[error("{operation} rejected: another pool operation is already in progress")]
    Reentrant { operation: &'static str },

    #[error("pool has outstanding units but no assets; deposits are blocked")]
    Insolvent,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("pool lock poisoned by a panic in an earlier operation")]
    Poisoned,
}

impl From<Vec<ValidationError>> for PoolError {
    fn from(errors: Vec<ValidationError>) -> Self {
        PoolError::Configuration(errors)
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
