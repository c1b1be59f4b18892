use tracing::{error, warn};

use crate::error::PoolError;
use crate::model::Assets;

use super::Pool;
use super::ledger::ShareLedger;

/// A capital movement performed during the current operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Movement {
    Invested { index: usize, amount: Assets },
    Returned { index: usize, amount: Assets },
}

/// Ledger state captured before an operation runs.
struct Snapshot {
    idle: Assets,
    ledger: ShareLedger,
    baseline: Assets,
    valuations: Vec<Assets>,
    events: usize,
}

impl Pool {
    /// Run `f` as one all-or-nothing operation.
    ///
    /// Rejects the call if another operation is in flight. On error the ledger
    /// is restored and every journaled adapter movement is reversed.
    pub(crate) fn transact<T>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut Pool) -> Result<T, PoolError>,
    ) -> Result<T, PoolError> {
        if let Some(active) = self.in_progress {
            warn!(operation, active, "re-entrant call rejected");
            return Err(PoolError::Reentrant { operation });
        }
        self.in_progress = Some(operation);
        self.journal.clear();
        let snapshot = self.snapshot();

        let result = f(self);
        if let Err(e) = &result {
            warn!(operation, error = %e, movements = self.journal.len(), "operation failed, rolling back");
            self.rollback(snapshot);
        }

        self.journal.clear();
        self.in_progress = None;
        result
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            idle: self.idle,
            ledger: self.ledger.clone(),
            baseline: self.donation.baseline(),
            valuations: self.strategies.iter().map(|s| s.last_valuation).collect(),
            events: self.events.len(),
        }
    }

    fn rollback(&mut self, snapshot: Snapshot) {
        self.idle = snapshot.idle;
        self.ledger = snapshot.ledger;
        self.donation.restore(snapshot.baseline);
        self.events.truncate(snapshot.events);
        for (entry, value) in self.strategies.iter_mut().zip(snapshot.valuations) {
            entry.last_valuation = value;
        }

        // Restored idle assumes every movement is undone. Where an adapter
        // refuses, idle and the cache are corrected to where the assets really are.
        let journal = std::mem::take(&mut self.journal);
        for movement in journal.into_iter().rev() {
            match movement {
                Movement::Invested { index, amount } => {
                    let entry = &mut self.strategies[index];
                    let recovered = match entry.adapter.return_capital(amount) {
                        Ok(returned) => returned,
                        Err(e) => {
                            error!(strategy = %entry.name, amount, error = %e, "rollback could not recover invested capital");
                            0
                        }
                    };
                    if recovered < amount {
                        let stranded = amount - recovered;
                        error!(strategy = %entry.name, stranded, "capital left in strategy after rollback");
                        self.idle = self.idle.saturating_sub(stranded);
                        entry.last_valuation = entry.last_valuation.saturating_add(stranded);
                    } else {
                        self.idle = self.idle.saturating_add(recovered - amount);
                    }
                }
                Movement::Returned { index, amount } => {
                    let entry = &mut self.strategies[index];
                    if let Err(e) = entry.adapter.accept_capital(amount) {
                        error!(strategy = %entry.name, amount, error = %e, "rollback could not re-invest returned capital, keeping it idle");
                        self.idle = self.idle.saturating_add(amount);
                        entry.last_valuation = entry.last_valuation.saturating_sub(amount);
                    }
                }
            }
        }
    }

    /// Whether an operation is currently executing.
    pub fn is_busy(&self) -> bool {
        self.in_progress.is_some()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::PoolError;
    use crate::model::{HolderId, PoolConfig, StrategyConfig};
    use crate::strategies::{SimulatedStrategy, StrategyAdapter};

    use super::Pool;

    fn pool() -> Pool {
        let config = PoolConfig {
            name: "guarded".into(),
            asset: "USDC".into(),
            donation_holder: "dragon".into(),
            idle_target_bps: 2000,
            strategies: vec![StrategyConfig {
                name: "s0".into(),
                target_bps: 8000,
            }],
            withdrawal_queue: None,
        };
        let adapters: Vec<Box<dyn StrategyAdapter>> = vec![Box::new(SimulatedStrategy::new())];
        Pool::new(config, adapters).unwrap()
    }

    #[test]
    fn test_nested_operation_rejected_by_flag() {
        let mut pool = pool();
        let alice = HolderId::new("alice");

        let nested = pool.transact("outer", |p| {
            assert!(p.is_busy());
            Ok(p.deposit(100, &alice))
        });

        assert!(matches!(
            nested,
            Ok(Err(PoolError::Reentrant { operation: "deposit" }))
        ));
        assert!(!pool.is_busy());
        assert_eq!(pool.total_units(), 0);
        pool.deposit(100, &alice).unwrap();
        assert_eq!(pool.total_units(), 100);
    }

    #[test]
    fn test_failed_operation_clears_flag() {
        let mut pool = pool();
        let result: Result<(), PoolError> = pool.transact("outer", |_| Err(PoolError::Overflow));
        assert!(result.is_err());
        assert!(!pool.is_busy());
        pool.check_invariants().unwrap();
    }
}
