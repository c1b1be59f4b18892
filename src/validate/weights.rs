use crate::math::weight_sum;
use crate::model::{Bps, MAX_BPS};

use super::ValidationError;

/// Check an idle target and a per-strategy weight vector against a pool of
/// `strategies` slots. The vector must have one entry per strategy and, together
/// with the idle target, sum to exactly 10000 bps.
pub fn check_targets(idle_bps: Bps, targets: &[Bps], strategies: usize) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if targets.len() != strategies {
        errors.push(ValidationError::WeightVectorLength {
            expected: strategies,
            got: targets.len(),
        });
    }

    if idle_bps > MAX_BPS {
        errors.push(ValidationError::BpsOutOfRange {
            field: "idle_target_bps".into(),
            value: idle_bps,
        });
    }
    for (i, &bps) in targets.iter().enumerate() {
        if bps > MAX_BPS {
            errors.push(ValidationError::BpsOutOfRange {
                field: format!("strategies[{i}].target_bps"),
                value: bps,
            });
        }
    }

    let sum = weight_sum(idle_bps, targets);
    if sum != u32::from(MAX_BPS) {
        errors.push(ValidationError::WeightSum { sum });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_sum_passes() {
        assert!(check_targets(2000, &[4000, 4000], 2).is_empty());
        assert!(check_targets(0, &[10_000], 1).is_empty());
        assert!(check_targets(10_000, &[0, 0], 2).is_empty());
    }

    #[test]
    fn test_short_sum_rejected() {
        let errors = check_targets(2000, &[4000, 3999], 2);
        assert!(matches!(errors[..], [ValidationError::WeightSum { sum: 9999 }]));
    }

    #[test]
    fn test_wrong_length_rejected() {
        let errors = check_targets(2000, &[8000], 2);
        assert!(matches!(
            errors[..],
            [ValidationError::WeightVectorLength {
                expected: 2,
                got: 1
            }]
        ));
    }

    #[test]
    fn test_single_entry_out_of_range() {
        let errors = check_targets(0, &[12_000, 0], 2);
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::BpsOutOfRange { value: 12_000, .. }))
        );
    }
}
