use std::ops::Deref;

use tracing::{debug, warn};

use crate::error::PoolError;
use crate::model::Assets;
use crate::validate::check_queue;

use super::Pool;
use super::events::Transfer;

/// Priority order over strategy indices used only to source liquidity.
///
/// Always a permutation of `[0, n)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalQueue(Vec<usize>);

impl WithdrawalQueue {
    pub fn new(order: Vec<usize>, strategies: usize) -> Result<Self, PoolError> {
        let errors = check_queue(&order, strategies);
        if !errors.is_empty() {
            return Err(PoolError::Configuration(errors));
        }
        Ok(Self(order))
    }
}

impl Deref for WithdrawalQueue {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

/// How adapter failures are treated while sourcing liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sourcing {
    /// Any adapter error aborts the enclosing operation (withdrawals).
    Strict,
    /// A failing strategy is skipped (idle-buffer refills).
    BestEffort,
}

#[derive(Debug, Default)]
pub(crate) struct SourcingOutcome {
    pub(crate) pulls: Vec<Transfer>,
    pub(crate) skipped: Vec<usize>,
    pub(crate) raised: Assets,
}

impl Pool {
    /// Pull up to `shortfall` into idle, draining strategies in queue order.
    ///
    /// Stops as soon as the shortfall is covered. The caller decides whether
    /// raising less than `shortfall` is an error.
    pub(crate) fn source_liquidity(
        &mut self,
        shortfall: Assets,
        mode: Sourcing,
    ) -> Result<SourcingOutcome, PoolError> {
        let mut outcome = SourcingOutcome::default();
        let mut remaining = shortfall;
        let order = self.queue.to_vec();

        for index in order {
            if remaining == 0 {
                break;
            }

            let available = match self.read_valuation(index) {
                Ok(v) => v,
                Err(e) if mode == Sourcing::BestEffort => {
                    warn!(error = %e, "skipping strategy while sourcing liquidity");
                    outcome.skipped.push(index);
                    continue;
                }
                Err(e) => return Err(e),
            };
            if available == 0 {
                continue;
            }

            let request = available.min(remaining);
            match self.divest(index, request) {
                Ok(returned) => {
                    remaining -= returned;
                    outcome.raised += returned;
                    if returned > 0 {
                        outcome.pulls.push(Transfer {
                            strategy: index,
                            amount: returned,
                        });
                    }
                }
                Err(e) if mode == Sourcing::BestEffort => {
                    warn!(error = %e, "skipping strategy while sourcing liquidity");
                    outcome.skipped.push(index);
                }
                Err(e) => return Err(e),
            }
        }

        debug!(shortfall, raised = outcome.raised, remaining, "liquidity sourced");
        Ok(outcome)
    }

    /// Make sure at least `assets` sit idle, pulling from the queue if needed.
    /// Fails with `InsufficientLiquidity` when the queue runs dry.
    pub(crate) fn ensure_idle(&mut self, assets: Assets) -> Result<(), PoolError> {
        if self.idle >= assets {
            return Ok(());
        }
        let shortfall = assets - self.idle;
        self.source_liquidity(shortfall, Sourcing::Strict)?;
        if self.idle < assets {
            return Err(PoolError::InsufficientLiquidity {
                requested: assets,
                available: self.idle,
            });
        }
        Ok(())
    }
}
