use std::collections::HashSet;

use crate::model::PoolConfig;

use super::ValidationError;

/// Check that the pool name, asset and donation holder are present.
pub fn check_identities(config: &PoolConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }
    if config.asset.trim().is_empty() {
        errors.push(ValidationError::EmptyAsset);
    }
    if !config.donation_holder.is_valid() {
        errors.push(ValidationError::InvalidIdentity {
            field: "donation_holder".into(),
        });
    }

    errors
}

/// Check that there is at least one strategy and that names are present and unique.
pub fn check_strategy_names(config: &PoolConfig) -> Vec<ValidationError> {
    if config.strategies.is_empty() {
        return vec![ValidationError::NoStrategies];
    }

    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for (index, strategy) in config.strategies.iter().enumerate() {
        if strategy.name.trim().is_empty() {
            errors.push(ValidationError::EmptyStrategyName { index });
        } else if !seen.insert(strategy.name.as_str()) {
            errors.push(ValidationError::DuplicateStrategyName {
                name: strategy.name.clone(),
            });
        }
    }

    errors
}
