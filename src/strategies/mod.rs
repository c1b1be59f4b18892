pub mod simulated;

use anyhow::Result;

use crate::model::Assets;

pub use simulated::SimulatedStrategy;

// ── Strategy adapter trait ──────────────────────────────────────────

/// Capability interface of a yield-generating sub-strategy.
///
/// The pool owns one boxed adapter per strategy slot and never inspects which
/// concrete adapter it holds. Adapters are external and untrusted: every call
/// may fail, and `return_capital` may hand back less than requested.
pub trait StrategyAdapter: Send {
    /// Take `amount` of the pool's asset and put it to work.
    ///
    /// On `Err` the adapter must not have kept any of the amount; the pool
    /// treats the tranche as still idle.
    fn accept_capital(&mut self, amount: Assets) -> Result<()>;

    /// Give back up to `amount` of the asset. Returns what was actually returned.
    fn return_capital(&mut self, amount: Assets) -> Result<Assets>;

    /// Current value of everything held for the pool, in asset units.
    fn valuation(&self) -> Result<Assets>;
}
