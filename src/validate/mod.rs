mod queue;
mod references;
mod weights;

use std::path::Path;

use thiserror::Error;

use crate::model::{Bps, PoolConfig};

pub use queue::check_queue;
pub use weights::check_targets;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pool name must not be empty")]
    EmptyName,

    #[error("Asset identity must not be empty")]
    EmptyAsset,

    #[error("Identity for `{field}` must not be empty")]
    InvalidIdentity { field: String },

    #[error("Pool needs at least one strategy")]
    NoStrategies,

    #[error("Strategy name at index {index} must not be empty")]
    EmptyStrategyName { index: usize },

    #[error("Duplicate strategy name `{name}`")]
    DuplicateStrategyName { name: String },

    #[error("`{field}` is {value} bps, outside valid range 0..=10000")]
    BpsOutOfRange { field: String, value: Bps },

    #[error("Idle target plus strategy targets sum to {sum} bps, expected exactly 10000")]
    WeightSum { sum: u32 },

    #[error("Weight vector has {got} entries, pool has {expected} strategies")]
    WeightVectorLength { expected: usize, got: usize },

    #[error("Withdrawal queue has {got} entries, pool has {expected} strategies")]
    QueueLength { expected: usize, got: usize },

    #[error("Withdrawal queue entry {index} is out of range for {strategies} strategies")]
    QueueIndexOutOfRange { index: usize, strategies: usize },

    #[error("Withdrawal queue lists strategy {index} more than once")]
    QueueDuplicate { index: usize },

    #[error("{got} adapters supplied for {expected} configured strategies")]
    AdapterCount { expected: usize, got: usize },
}

/// Load and fully validate a pool configuration from a JSON file.
pub fn load_and_validate(path: &Path) -> Result<PoolConfig, Vec<ValidationError>> {
    let contents = std::fs::read_to_string(path).map_err(|e| vec![ValidationError::Io(e)])?;
    let config: PoolConfig =
        serde_json::from_str(&contents).map_err(|e| vec![ValidationError::Json(e)])?;
    validate(&config)?;
    Ok(config)
}

/// Validate a pool configuration, collecting all errors.
pub fn validate(config: &PoolConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    errors.extend(references::check_identities(config));
    errors.extend(references::check_strategy_names(config));
    if !config.strategies.is_empty() {
        errors.extend(check_targets(
            config.idle_target_bps,
            &config.target_vector(),
            config.strategies.len(),
        ));
        errors.extend(check_queue(&config.resolved_queue(), config.strategies.len()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// CLI entry point for the `validate` subcommand.
pub fn run(path: &Path) -> anyhow::Result<()> {
    match load_and_validate(path) {
        Ok(config) => {
            println!(
                "Pool '{}' is valid. asset={}, {} strategies, idle target {} bps.",
                config.name,
                config.asset,
                config.strategies.len(),
                config.idle_target_bps
            );
            Ok(())
        }
        Err(errors) => {
            eprintln!("Validation failed with {} error(s):", errors.len());
            for (i, e) in errors.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, e);
            }
            std::process::exit(1);
        }
    }
}
