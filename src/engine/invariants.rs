use thiserror::Error;

use crate::math::weight_sum;
use crate::model::{MAX_BPS, Units};
use crate::validate::check_queue;

use super::Pool;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("holder balances sum to {sum:?}, total units is {total}")]
    PhantomUnits { sum: Option<Units>, total: Units },

    #[error("idle target plus strategy targets sum to {sum} bps")]
    WeightSum { sum: u32 },

    #[error("withdrawal queue {queue:?} is not a permutation of the strategy indices")]
    QueueNotPermutation { queue: Vec<usize> },

    #[error("operation `{operation}` still marked in progress")]
    OperationInProgress { operation: &'static str },
}

impl Pool {
    /// Check the ledger's structural invariants.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let total = self.ledger.total_units();
        let sum = self.ledger.sum_of_balances();
        if sum != Some(total) {
            return Err(InvariantViolation::PhantomUnits { sum, total });
        }

        let targets: Vec<_> = self.strategies.iter().map(|s| s.target_bps).collect();
        let sum = weight_sum(self.idle_target_bps, &targets);
        if sum != u32::from(MAX_BPS) {
            return Err(InvariantViolation::WeightSum { sum });
        }

        if !check_queue(&self.queue, self.strategies.len()).is_empty() {
            return Err(InvariantViolation::QueueNotPermutation {
                queue: self.queue.to_vec(),
            });
        }

        if let Some(operation) = self.in_progress {
            return Err(InvariantViolation::OperationInProgress { operation });
        }
        Ok(())
    }
}
