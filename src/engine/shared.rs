use std::sync::{Arc, Mutex, TryLockError};

use crate::error::PoolError;
use crate::model::{Assets, Bps, HolderId, Units};

use super::Pool;
use super::events::{RebalanceOutcome, ReportOutcome};

/// Cloneable handle to a pool, for collaborators that need to call back into it.
///
/// Calls never wait: if the pool is already executing an operation (including
/// one further up the current call stack) they fail with `PoolError::Reentrant`.
#[derive(Clone)]
pub struct SharedPool {
    inner: Arc<Mutex<Pool>>,
}

impl SharedPool {
    pub fn new(pool: Pool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    /// Run `f` against the pool if no other operation holds it.
    pub fn with<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut Pool) -> Result<T, PoolError>,
    ) -> Result<T, PoolError> {
        match self.inner.try_lock() {
            Ok(mut pool) => f(&mut pool),
            Err(TryLockError::WouldBlock) => Err(PoolError::Reentrant { operation }),
            Err(TryLockError::Poisoned(_)) => Err(PoolError::Poisoned),
        }
    }

    pub fn deposit(&self, assets: Assets, receiver: &HolderId) -> Result<Units, PoolError> {
        self.with("deposit", |pool| pool.deposit(assets, receiver))
    }

    pub fn mint(&self, units: Units, receiver: &HolderId) -> Result<Assets, PoolError> {
        self.with("mint", |pool| pool.mint(units, receiver))
    }

    pub fn withdraw(
        &self,
        assets: Assets,
        receiver: &HolderId,
        owner: &HolderId,
    ) -> Result<Units, PoolError> {
        self.with("withdraw", |pool| pool.withdraw(assets, receiver, owner))
    }

    pub fn redeem(
        &self,
        units: Units,
        receiver: &HolderId,
        owner: &HolderId,
    ) -> Result<Assets, PoolError> {
        self.with("redeem", |pool| pool.redeem(units, receiver, owner))
    }

    pub fn report(&self) -> Result<ReportOutcome, PoolError> {
        self.with("report", |pool| pool.report())
    }

    pub fn rebalance(&self) -> Result<RebalanceOutcome, PoolError> {
        self.with("rebalance", |pool| pool.rebalance())
    }

    pub fn set_targets(&self, idle_target_bps: Bps, targets: Vec<Bps>) -> Result<(), PoolError> {
        self.with("set_targets", |pool| pool.set_targets(idle_target_bps, targets))
    }

    pub fn set_withdrawal_queue(&self, order: Vec<usize>) -> Result<(), PoolError> {
        self.with("set_withdrawal_queue", |pool| pool.set_withdrawal_queue(order))
    }
}
