use super::ValidationError;

/// Check that `queue` is a permutation of `[0, strategies)`.
pub fn check_queue(queue: &[usize], strategies: usize) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if queue.len() != strategies {
        errors.push(ValidationError::QueueLength {
            expected: strategies,
            got: queue.len(),
        });
    }

    let mut seen = vec![false; strategies];
    for &index in queue {
        match seen.get_mut(index) {
            None => errors.push(ValidationError::QueueIndexOutOfRange { index, strategies }),
            Some(true) => errors.push(ValidationError::QueueDuplicate { index }),
            Some(slot) => *slot = true,
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permutation_passes() {
        assert!(check_queue(&[2, 0, 1], 3).is_empty());
    }

    #[test]
    fn test_out_of_range() {
        let errors = check_queue(&[0, 3, 1], 3);
        assert!(matches!(
            errors[..],
            [ValidationError::QueueIndexOutOfRange {
                index: 3,
                strategies: 3
            }]
        ));
    }

    #[test]
    fn test_duplicate_and_missing() {
        let errors = check_queue(&[0, 0], 2);
        assert!(matches!(errors[..], [ValidationError::QueueDuplicate { index: 0 }]));
    }

    #[test]
    fn test_too_short() {
        let errors = check_queue(&[1], 2);
        assert!(matches!(
            errors[..],
            [ValidationError::QueueLength {
                expected: 2,
                got: 1
            }]
        ));
    }
}
