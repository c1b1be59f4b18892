use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::Pool;
use crate::engine::events::PoolEvent;
use crate::error::PoolError;
use crate::model::{Assets, Units};
use crate::strategies::SimulatedStrategy;

/// Pool state captured after a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub idle: Assets,
    /// Holdings of each simulated strategy, in registration order.
    pub strategies: Vec<Assets>,
    pub total_assets: Assets,
    pub total_units: Units,
    pub donation_units: Units,
    pub baseline: Assets,
    pub holders: BTreeMap<String, Units>,
}

impl PoolSnapshot {
    pub fn capture(pool: &Pool, markets: &[SimulatedStrategy]) -> Result<Self, PoolError> {
        Ok(Self {
            idle: pool.idle_balance(),
            strategies: markets.iter().map(|m| m.holdings()).collect(),
            total_assets: pool.total_managed_assets()?,
            total_units: pool.total_units(),
            donation_units: pool.balance_of(pool.donation_holder()),
            baseline: pool.baseline(),
            holders: pool
                .holders()
                .map(|(h, u)| (h.to_string(), u))
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub label: String,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub state: PoolSnapshot,
}

/// Output of a scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub pool: String,
    pub asset: String,
    pub strategies: Vec<String>,
    pub steps: Vec<StepRecord>,
    pub final_state: PoolSnapshot,
    pub events: Vec<PoolEvent>,
}

impl SimulationResult {
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|s| s.error.is_some())
    }

    /// Print a step-by-step table of the run.
    pub fn print_table(&self) {
        let strategy_cols = self.strategies.len() * 11;
        let width = 96 + strategy_cols;

        println!("\n{}", "═".repeat(width));
        println!("  Simulation: {} ({})", self.pool, self.asset);
        println!("{}", "═".repeat(width));

        let mut header = format!("  {:<3} {:<28} {:>10}", "#", "Step", "Idle");
        for name in &self.strategies {
            header.push_str(&format!(" {:>10}", truncate(name, 10)));
        }
        header.push_str(&format!(
            " {:>10} {:>10} {:>10} {:>10}  {}",
            "Total", "Units", "Donation", "Baseline", "Result"
        ));
        println!("{header}");
        println!("  {}", "-".repeat(width - 2));

        for step in &self.steps {
            let s = &step.state;
            let mut line = format!("  {:<3} {:<28} {:>10}", step.index, truncate(&step.label, 28), s.idle);
            for value in &s.strategies {
                line.push_str(&format!(" {value:>10}"));
            }
            let result = match &step.error {
                Some(e) => format!("ERROR: {e}"),
                None => step.result.clone(),
            };
            line.push_str(&format!(
                " {:>10} {:>10} {:>10} {:>10}  {}",
                s.total_assets, s.total_units, s.donation_units, s.baseline, result
            ));
            println!("{line}");
        }

        println!("{}", "═".repeat(width));
        println!("  Final holders:");
        for (holder, units) in &self.final_state.holders {
            println!("    {holder:<24} {units:>12} units");
        }
        let failed = self.failed_steps().count();
        if failed > 0 {
            println!("  {failed} step(s) failed");
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
