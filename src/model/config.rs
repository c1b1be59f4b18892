use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::amount::Bps;
use super::holder::HolderId;

/// Construction-time configuration of a pool.
///
/// The strategy set is fixed here: the adapters handed to `Pool::new` must match
/// `strategies` one-to-one, in the same order. Target weights, the idle target and
/// the withdrawal queue can be changed later through governance operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PoolConfig {
    /// Human-readable name for this pool.
    pub name: String,
    /// Symbol or identifier of the single underlying asset (e.g. "USDC").
    pub asset: String,
    /// Identity that receives units minted on profit and whose units are burned first on loss.
    pub donation_holder: HolderId,
    /// Fraction of total managed assets kept idle, in basis points.
    pub idle_target_bps: Bps,
    /// Sub-strategies in registration order.
    pub strategies: Vec<StrategyConfig>,
    /// Priority order (strategy indices) used to source liquidity for withdrawals.
    /// Defaults to registration order when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawal_queue: Option<Vec<usize>>,
}

/// One sub-strategy slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StrategyConfig {
    /// Unique label for the strategy (used in logs and events).
    pub name: String,
    /// Desired fraction of total managed assets held in this strategy, in basis points.
    pub target_bps: Bps,
}

impl PoolConfig {
    /// Target weights of all strategies, in registration order.
    pub fn target_vector(&self) -> Vec<Bps> {
        self.strategies.iter().map(|s| s.target_bps).collect()
    }

    /// The configured withdrawal queue, or registration order if none was given.
    pub fn resolved_queue(&self) -> Vec<usize> {
        self.withdrawal_queue
            .clone()
            .unwrap_or_else(|| (0..self.strategies.len()).collect())
    }
}
