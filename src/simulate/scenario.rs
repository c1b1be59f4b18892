use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{Assets, Bps, HolderId, PoolConfig, Units};

/// A pool configuration plus a scripted sequence of operations and market moves,
/// run against simulated strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Scenario {
    pub pool: PoolConfig,
    pub steps: Vec<Step>,
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Deposit assets for `holder`.
    Deposit { holder: HolderId, assets: Assets },
    /// Mint an exact number of units for `holder`.
    Mint { holder: HolderId, units: Units },
    /// Withdraw an exact asset amount from `owner`'s units.
    Withdraw {
        owner: HolderId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receiver: Option<HolderId>,
        assets: Assets,
    },
    /// Redeem `units` owned by `owner`.
    Redeem {
        owner: HolderId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receiver: Option<HolderId>,
        units: Units,
    },
    /// Yield appears at a strategy.
    Gain { strategy: usize, assets: Assets },
    /// A strategy loses value.
    Lose { strategy: usize, assets: Assets },
    /// Accrue yield in basis points of current holdings; all strategies when `strategy` is omitted.
    Accrue {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        strategy: Option<usize>,
        bps: Bps,
    },
    Report,
    Rebalance,
    SetTargets { idle_target_bps: Bps, targets: Vec<Bps> },
    SetQueue { queue: Vec<usize> },
    /// Switch simulated outages on or off for one strategy.
    Outage {
        strategy: usize,
        #[serde(default)]
        accept: bool,
        #[serde(default)]
        return_capital: bool,
        #[serde(default)]
        valuation: bool,
    },
    /// Cap how much a strategy returns per call; omit `cap` to remove the limit.
    LiquidityCap {
        strategy: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cap: Option<Assets>,
    },
}

impl Step {
    /// Short label for tables and logs.
    pub fn label(&self) -> String {
        match self {
            Step::Deposit { holder, assets } => format!("deposit {assets} → {holder}"),
            Step::Mint { holder, units } => format!("mint {units}u → {holder}"),
            Step::Withdraw { owner, assets, .. } => format!("withdraw {assets} ← {owner}"),
            Step::Redeem { owner, units, .. } => format!("redeem {units}u ← {owner}"),
            Step::Gain { strategy, assets } => format!("gain s{strategy} +{assets}"),
            Step::Lose { strategy, assets } => format!("lose s{strategy} -{assets}"),
            Step::Accrue { strategy: Some(s), bps } => format!("accrue s{s} {bps}bps"),
            Step::Accrue { strategy: None, bps } => format!("accrue all {bps}bps"),
            Step::Report => "report".to_string(),
            Step::Rebalance => "rebalance".to_string(),
            Step::SetTargets { idle_target_bps, targets } => {
                format!("targets idle={idle_target_bps} {targets:?}")
            }
            Step::SetQueue { queue } => format!("queue {queue:?}"),
            Step::Outage {
                strategy,
                accept,
                return_capital,
                valuation,
            } => format!("outage s{strategy} a={accept} r={return_capital} v={valuation}"),
            Step::LiquidityCap { strategy, cap } => format!("cap s{strategy} {cap:?}"),
        }
    }
}
