use serde::{Deserialize, Serialize};

use crate::model::{Assets, Bps, HolderId, Units};

/// A capital movement between idle and one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub strategy: usize,
    pub amount: Assets,
}

/// What a `report` did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOutcome {
    pub previous_baseline: Assets,
    pub current: Assets,
    pub profit: Assets,
    pub loss: Assets,
    pub units_minted: Units,
    pub units_burned: Units,
    /// Strategies whose valuation could not be read; their last known value was used.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stale: Vec<String>,
}

/// What a rebalance did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceOutcome {
    /// Idle surplus pushed into under-target strategies.
    pub invested: Vec<Transfer>,
    /// Capital pulled from strategies (queue order) to refill the idle buffer.
    pub raised: Vec<Transfer>,
    /// Strategies that failed a call and were passed over.
    pub skipped: Vec<usize>,
    pub idle_after: Assets,
}

impl RebalanceOutcome {
    pub fn is_noop(&self) -> bool {
        self.invested.is_empty() && self.raised.is_empty() && self.skipped.is_empty()
    }

    pub fn total_invested(&self) -> Assets {
        self.invested.iter().map(|t| t.amount).sum()
    }

    pub fn total_raised(&self) -> Assets {
        self.raised.iter().map(|t| t.amount).sum()
    }
}

/// Audit trail entry, one per successful pool operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PoolEvent {
    Deposit {
        receiver: HolderId,
        assets: Assets,
        units: Units,
    },
    Withdraw {
        receiver: HolderId,
        owner: HolderId,
        assets: Assets,
        units: Units,
    },
    Report(ReportOutcome),
    Rebalance(RebalanceOutcome),
    TargetsUpdated {
        idle_target_bps: Bps,
        targets: Vec<Bps>,
    },
    QueueUpdated {
        queue: Vec<usize>,
    },
}
