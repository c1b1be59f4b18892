use crate::model::{HolderId, PoolConfig, StrategyConfig};

use super::scenario::{Scenario, Step};

/// A walk through the pool's life cycle: fill, earn, lose, drain.
pub fn scenario() -> Scenario {
    let alice = HolderId::new("alice");
    let bob = HolderId::new("bob");

    Scenario {
        pool: PoolConfig {
            name: "usdc-donating-allocator".to_string(),
            asset: "USDC".to_string(),
            donation_holder: HolderId::new("dragon-router"),
            idle_target_bps: 2000,
            strategies: vec![
                StrategyConfig {
                    name: "aave-v3".to_string(),
                    target_bps: 4000,
                },
                StrategyConfig {
                    name: "morpho-steakhouse".to_string(),
                    target_bps: 4000,
                },
            ],
            withdrawal_queue: Some(vec![0, 1]),
        },
        steps: vec![
            // ── Fill ────────────────────────────────────────────
            Step::Deposit {
                holder: alice.clone(),
                assets: 1000,
            },
            Step::Deposit {
                holder: bob.clone(),
                assets: 500,
            },
            // ── Earn: yield goes to the donation holder ─────────
            Step::Accrue {
                strategy: None,
                bps: 250,
            },
            Step::Report,
            Step::Rebalance,
            // ── Lose: donation units absorb it first ────────────
            Step::Lose {
                strategy: 1,
                assets: 20,
            },
            Step::Report,
            // ── Governance ──────────────────────────────────────
            Step::SetTargets {
                idle_target_bps: 1000,
                targets: vec![3000, 6000],
            },
            Step::SetQueue { queue: vec![1, 0] },
            Step::Rebalance,
            // ── Drain ───────────────────────────────────────────
            Step::Withdraw {
                owner: alice.clone(),
                receiver: None,
                assets: 600,
            },
            Step::LiquidityCap {
                strategy: 0,
                cap: Some(50),
            },
            Step::Withdraw {
                owner: bob.clone(),
                receiver: None,
                assets: 450,
            },
            Step::LiquidityCap {
                strategy: 0,
                cap: None,
            },
            Step::Redeem {
                owner: bob,
                receiver: None,
                units: 100,
            },
        ],
    }
}
