use serde::Serialize;
use tracing::{debug, warn};

use crate::error::PoolError;
use crate::model::{Assets, Bps};
use crate::strategies::StrategyAdapter;

use super::Pool;
use super::txn::Movement;

/// A strategy slot owned by the pool.
pub(crate) struct StrategyEntry {
    pub(crate) name: String,
    pub(crate) adapter: Box<dyn StrategyAdapter>,
    pub(crate) target_bps: Bps,
    /// Last valuation read from the adapter, moved by capital the pool sends or receives.
    pub(crate) last_valuation: Assets,
}

/// Read-only view of a strategy slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyView {
    pub index: usize,
    pub name: String,
    pub target_bps: Bps,
    pub last_valuation: Assets,
}

/// Valuations of every strategy gathered in one pass.
#[derive(Debug, Clone, Default)]
pub(crate) struct Valuations {
    pub(crate) per_strategy: Vec<Assets>,
    /// Indices whose read failed and fell back to the cached value.
    pub(crate) stale: Vec<usize>,
    pub(crate) total: Assets,
}

impl Pool {
    fn adapter_failure(&self, index: usize, reason: impl ToString) -> PoolError {
        PoolError::AdapterFailure {
            strategy: self.strategies[index].name.clone(),
            reason: reason.to_string(),
        }
    }

    /// Read one strategy's valuation, updating the cache.
    pub(crate) fn read_valuation(&mut self, index: usize) -> Result<Assets, PoolError> {
        match self.strategies[index].adapter.valuation() {
            Ok(value) => {
                self.strategies[index].last_valuation = value;
                Ok(value)
            }
            Err(e) => Err(self.adapter_failure(index, format!("valuation: {e:#}"))),
        }
    }

    /// Read every valuation, falling back to the cached value for strategies
    /// whose read fails. Includes idle in the total.
    pub(crate) fn refresh_valuations(&mut self) -> Result<Valuations, PoolError> {
        let mut valuations = Valuations {
            total: self.idle,
            ..Default::default()
        };
        for index in 0..self.strategies.len() {
            let value = match self.read_valuation(index) {
                Ok(value) => value,
                Err(e) => {
                    let cached = self.strategies[index].last_valuation;
                    warn!(error = %e, cached, "valuation unavailable, using last known value");
                    valuations.stale.push(index);
                    cached
                }
            };
            valuations.total = valuations
                .total
                .checked_add(value)
                .ok_or(PoolError::Overflow)?;
            valuations.per_strategy.push(value);
        }
        Ok(valuations)
    }

    /// Same as `refresh_valuations` but without touching the cache. Used by views.
    pub(crate) fn peek_total(&self) -> Result<Assets, PoolError> {
        self.strategies.iter().try_fold(self.idle, |acc, entry| {
            let value = entry.adapter.valuation().unwrap_or(entry.last_valuation);
            acc.checked_add(value).ok_or(PoolError::Overflow)
        })
    }

    /// Move `amount` from idle into strategy `index`.
    pub(crate) fn invest(&mut self, index: usize, amount: Assets) -> Result<(), PoolError> {
        if amount > self.idle {
            return Err(PoolError::InsufficientLiquidity {
                requested: amount,
                available: self.idle,
            });
        }
        if let Err(e) = self.strategies[index].adapter.accept_capital(amount) {
            return Err(self.adapter_failure(index, format!("accept_capital({amount}): {e:#}")));
        }
        self.idle -= amount;
        let entry = &mut self.strategies[index];
        entry.last_valuation = entry.last_valuation.saturating_add(amount);
        self.journal.push(Movement::Invested { index, amount });
        debug!(strategy = %entry.name, amount, idle = self.idle, "invested");
        Ok(())
    }

    /// Ask strategy `index` for up to `amount` and credit whatever comes back to idle.
    ///
    /// Returning more than requested is an adapter failure; the surplus is still
    /// credited and journaled so a rollback hands it back.
    pub(crate) fn divest(&mut self, index: usize, amount: Assets) -> Result<Assets, PoolError> {
        let returned = match self.strategies[index].adapter.return_capital(amount) {
            Ok(returned) => returned,
            Err(e) => {
                return Err(self.adapter_failure(index, format!("return_capital({amount}): {e:#}")));
            }
        };
        self.idle = self.idle.checked_add(returned).ok_or(PoolError::Overflow)?;
        let entry = &mut self.strategies[index];
        entry.last_valuation = entry.last_valuation.saturating_sub(returned);
        self.journal.push(Movement::Returned {
            index,
            amount: returned,
        });
        debug!(strategy = %entry.name, requested = amount, returned, idle = self.idle, "divested");

        if returned > amount {
            return Err(self.adapter_failure(
                index,
                format!("returned {returned}, more than the {amount} requested"),
            ));
        }
        Ok(returned)
    }
}
