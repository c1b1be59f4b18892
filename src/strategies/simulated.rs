use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow, bail};

use crate::math::bps_of;
use crate::model::{Assets, Bps};

use super::StrategyAdapter;

/// State of the simulated yield source behind a [`SimulatedStrategy`].
#[derive(Debug, Clone, Default)]
pub struct MarketState {
    /// Assets currently held for the pool (principal plus accrued yield).
    pub holdings: Assets,
    /// Maximum amount returned per `return_capital` call. `None` = unlimited.
    pub liquidity_cap: Option<Assets>,
    pub fail_accept: bool,
    pub fail_return: bool,
    pub fail_valuation: bool,
    /// Cumulative gains injected via `gain`/`accrue_bps`.
    pub total_gain: Assets,
    /// Cumulative losses injected via `lose`.
    pub total_loss: Assets,
}

/// In-memory strategy adapter for simulations and tests.
///
/// Cloning yields another handle on the same market, so a scenario can keep a
/// handle to move the valuation (yield, losses, outages) while the pool owns
/// the adapter.
#[derive(Debug, Clone, Default)]
pub struct SimulatedStrategy {
    market: Arc<Mutex<MarketState>>,
}

impl SimulatedStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// A strategy that already holds `holdings` assets.
    pub fn with_holdings(holdings: Assets) -> Self {
        let strategy = Self::new();
        strategy.state().holdings = holdings;
        strategy
    }

    fn state(&self) -> MutexGuard<'_, MarketState> {
        // A panic while holding this lock can only come from a test thread;
        // the data is plain numbers, so recovering it is safe.
        self.market.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> MarketState {
        self.state().clone()
    }

    pub fn holdings(&self) -> Assets {
        self.state().holdings
    }

    /// Increase the valuation by `amount` (yield accrued at the source).
    pub fn gain(&self, amount: Assets) {
        let mut s = self.state();
        s.holdings = s.holdings.saturating_add(amount);
        s.total_gain = s.total_gain.saturating_add(amount);
    }

    /// Decrease the valuation by up to `amount` (a loss at the source).
    pub fn lose(&self, amount: Assets) {
        let mut s = self.state();
        let lost = amount.min(s.holdings);
        s.holdings -= lost;
        s.total_loss = s.total_loss.saturating_add(lost);
    }

    /// Accrue yield as a fraction of current holdings, in basis points.
    pub fn accrue_bps(&self, bps: Bps) {
        let accrued = bps_of(self.holdings(), bps).unwrap_or(0);
        self.gain(accrued);
    }

    pub fn set_liquidity_cap(&self, cap: Option<Assets>) {
        self.state().liquidity_cap = cap;
    }

    pub fn set_fail_accept(&self, fail: bool) {
        self.state().fail_accept = fail;
    }

    pub fn set_fail_return(&self, fail: bool) {
        self.state().fail_return = fail;
    }

    pub fn set_fail_valuation(&self, fail: bool) {
        self.state().fail_valuation = fail;
    }
}

impl StrategyAdapter for SimulatedStrategy {
    fn accept_capital(&mut self, amount: Assets) -> Result<()> {
        let mut s = self.state();
        if s.fail_accept {
            bail!("simulated deposit outage");
        }
        s.holdings = s
            .holdings
            .checked_add(amount)
            .ok_or_else(|| anyhow!("holdings overflow"))?;
        Ok(())
    }

    fn return_capital(&mut self, amount: Assets) -> Result<Assets> {
        let mut s = self.state();
        if s.fail_return {
            bail!("simulated withdrawal outage");
        }
        let mut returned = amount.min(s.holdings);
        if let Some(cap) = s.liquidity_cap {
            returned = returned.min(cap);
        }
        s.holdings -= returned;
        Ok(returned)
    }

    fn valuation(&self) -> Result<Assets> {
        let s = self.state();
        if s.fail_valuation {
            bail!("simulated price feed outage");
        }
        Ok(s.holdings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_market() {
        let handle = SimulatedStrategy::new();
        let mut adapter = handle.clone();
        adapter.accept_capital(100).unwrap();
        handle.gain(5);
        assert_eq!(adapter.valuation().unwrap(), 105);
        assert_eq!(handle.snapshot().total_gain, 5);
    }

    #[test]
    fn test_liquidity_cap_limits_returns() {
        let mut s = SimulatedStrategy::with_holdings(100);
        s.set_liquidity_cap(Some(30));
        assert_eq!(s.return_capital(50).unwrap(), 30);
        assert_eq!(s.holdings(), 70);
    }

    #[test]
    fn test_failures() {
        let mut s = SimulatedStrategy::with_holdings(10);
        s.set_fail_accept(true);
        assert!(s.accept_capital(1).is_err());
        assert_eq!(s.holdings(), 10);
        s.set_fail_valuation(true);
        assert!(s.valuation().is_err());
    }

    #[test]
    fn test_lose_saturates() {
        let s = SimulatedStrategy::with_holdings(10);
        s.lose(25);
        assert_eq!(s.holdings(), 0);
        assert_eq!(s.snapshot().total_loss, 10);
    }
}
