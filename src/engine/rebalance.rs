use tracing::{debug, info, warn};

use crate::error::PoolError;
use crate::math::bps_of;
use crate::model::Assets;

use super::Pool;
use super::events::{PoolEvent, RebalanceOutcome, Transfer};
use super::queue::Sourcing;
use super::strategy::Valuations;

impl Pool {
    /// Steer idle capital toward the target weights.
    ///
    /// Surplus idle is pushed into under-target strategies in registration
    /// order; a shortfall against the idle target is pulled from the
    /// withdrawal queue. Strategies that fail a call are skipped. Running it
    /// again without an intervening mutation changes nothing.
    pub fn rebalance(&mut self) -> Result<RebalanceOutcome, PoolError> {
        self.transact("rebalance", |pool| pool.run_rebalance())
    }

    /// Rebalance body, shared with deposits and withdrawals.
    pub(crate) fn run_rebalance(&mut self) -> Result<RebalanceOutcome, PoolError> {
        let valuations = self.refresh_valuations()?;
        let desired_idle = bps_of(valuations.total, self.idle_target_bps).ok_or(PoolError::Overflow)?;

        let mut outcome = if self.idle > desired_idle {
            self.invest_surplus(self.idle - desired_idle, &valuations)?
        } else if self.idle < desired_idle {
            let sourced = self.source_liquidity(desired_idle - self.idle, Sourcing::BestEffort)?;
            RebalanceOutcome {
                raised: sourced.pulls,
                skipped: sourced.skipped,
                ..Default::default()
            }
        } else {
            RebalanceOutcome::default()
        };
        outcome.idle_after = self.idle;

        if !outcome.is_noop() {
            info!(
                total = valuations.total,
                desired_idle,
                idle = self.idle,
                invested = outcome.total_invested(),
                raised = outcome.total_raised(),
                skipped = outcome.skipped.len(),
                "rebalanced"
            );
            self.events.push(PoolEvent::Rebalance(outcome.clone()));
        }
        Ok(outcome)
    }

    fn invest_surplus(
        &mut self,
        investable: Assets,
        valuations: &Valuations,
    ) -> Result<RebalanceOutcome, PoolError> {
        let mut outcome = RebalanceOutcome::default();
        let mut remaining = investable;

        for index in 0..self.strategies.len() {
            if remaining == 0 {
                break;
            }
            let desired =
                bps_of(valuations.total, self.strategies[index].target_bps).ok_or(PoolError::Overflow)?;
            let current = valuations.per_strategy[index];
            if current >= desired {
                continue;
            }

            let amount = (desired - current).min(remaining);
            match self.invest(index, amount) {
                Ok(()) => {
                    remaining -= amount;
                    outcome.invested.push(Transfer {
                        strategy: index,
                        amount,
                    });
                }
                Err(e) => {
                    warn!(error = %e, amount, "tranche stays idle");
                    outcome.skipped.push(index);
                }
            }
        }

        debug!(investable, left_idle = remaining, "surplus invested");
        Ok(outcome)
    }
}
