pub mod example;
pub mod result;
pub mod scenario;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::engine::Pool;
use crate::strategies::{SimulatedStrategy, StrategyAdapter};
use crate::validate;

use result::{PoolSnapshot, SimulationResult, StepRecord};
use scenario::{Scenario, Step};

/// Configuration for a simulation run.
pub struct SimulationConfig {
    pub scenario_path: PathBuf,
    pub output: Option<PathBuf>,
}

/// Run a scenario from the CLI.
pub fn run(config: &SimulationConfig) -> Result<()> {
    let scenario = load_scenario(&config.scenario_path)?;
    let result = run_scenario(&scenario)?;

    result.print_table();

    if let Some(ref output_path) = config.output {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(output_path, json)
            .with_context(|| format!("writing {}", output_path.display()))?;
        println!("  Results written to {}", output_path.display());
    }

    Ok(())
}

/// Load a scenario file and validate its pool configuration.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let scenario: Scenario = serde_json::from_str(&contents).context("parsing scenario")?;
    validate::validate(&scenario.pool).map_err(|errors| {
        let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        anyhow::anyhow!("Pool validation failed:\n  {}", msgs.join("\n  "))
    })?;
    Ok(scenario)
}

/// Build a pool over fresh simulated strategies and play every step.
///
/// A step that fails is recorded with its error and the run continues:
/// rejected withdrawals and the like are expected scenario outcomes.
pub fn run_scenario(scenario: &Scenario) -> Result<SimulationResult> {
    let markets: Vec<SimulatedStrategy> = scenario
        .pool
        .strategies
        .iter()
        .map(|_| SimulatedStrategy::new())
        .collect();
    let adapters: Vec<Box<dyn StrategyAdapter>> = markets
        .iter()
        .map(|m| Box::new(m.clone()) as Box<dyn StrategyAdapter>)
        .collect();
    let mut pool = Pool::new(scenario.pool.clone(), adapters)?;

    let mut steps = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let label = step.label();
        let outcome = apply_step(&mut pool, &markets, step);
        let (result, error) = match outcome {
            Ok(summary) => (summary, None),
            Err(e) => {
                warn!(step = index, %label, error = %e, "step failed");
                (String::new(), Some(e.to_string()))
            }
        };
        if let Err(violation) = pool.check_invariants() {
            bail!("invariant violated after step {index} ({label}): {violation}");
        }
        steps.push(StepRecord {
            index,
            label,
            result,
            error,
            state: PoolSnapshot::capture(&pool, &markets)?,
        });
    }

    info!(steps = steps.len(), "scenario complete");
    Ok(SimulationResult {
        pool: pool.name().to_string(),
        asset: pool.asset().to_string(),
        strategies: pool.strategies().into_iter().map(|s| s.name).collect(),
        final_state: PoolSnapshot::capture(&pool, &markets)?,
        steps,
        events: pool.take_events(),
    })
}

fn market(markets: &[SimulatedStrategy], index: usize) -> Result<&SimulatedStrategy> {
    markets
        .get(index)
        .with_context(|| format!("strategy index {index} out of range"))
}

fn apply_step(pool: &mut Pool, markets: &[SimulatedStrategy], step: &Step) -> Result<String> {
    let summary = match step {
        Step::Deposit { holder, assets } => {
            let units = pool.deposit(*assets, holder)?;
            format!("{units} units")
        }
        Step::Mint { holder, units } => {
            let assets = pool.mint(*units, holder)?;
            format!("{assets} assets")
        }
        Step::Withdraw {
            owner,
            receiver,
            assets,
        } => {
            let receiver = receiver.as_ref().unwrap_or(owner);
            let units = pool.withdraw(*assets, receiver, owner)?;
            format!("{units} units burned")
        }
        Step::Redeem {
            owner,
            receiver,
            units,
        } => {
            let receiver = receiver.as_ref().unwrap_or(owner);
            let assets = pool.redeem(*units, receiver, owner)?;
            format!("{assets} assets paid")
        }
        Step::Gain { strategy, assets } => {
            market(markets, *strategy)?.gain(*assets);
            String::new()
        }
        Step::Lose { strategy, assets } => {
            market(markets, *strategy)?.lose(*assets);
            String::new()
        }
        Step::Accrue { strategy, bps } => {
            match strategy {
                Some(index) => market(markets, *index)?.accrue_bps(*bps),
                None => markets.iter().for_each(|m| m.accrue_bps(*bps)),
            }
            String::new()
        }
        Step::Report => {
            let r = pool.report()?;
            format!("+{}u / -{}u", r.units_minted, r.units_burned)
        }
        Step::Rebalance => {
            let r = pool.rebalance()?;
            format!("in {} / out {}", r.total_invested(), r.total_raised())
        }
        Step::SetTargets {
            idle_target_bps,
            targets,
        } => {
            pool.set_targets(*idle_target_bps, targets.clone())?;
            String::new()
        }
        Step::SetQueue { queue } => {
            pool.set_withdrawal_queue(queue.clone())?;
            String::new()
        }
        Step::Outage {
            strategy,
            accept,
            return_capital,
            valuation,
        } => {
            let m = market(markets, *strategy)?;
            m.set_fail_accept(*accept);
            m.set_fail_return(*return_capital);
            m.set_fail_valuation(*valuation);
            String::new()
        }
        Step::LiquidityCap { strategy, cap } => {
            market(markets, *strategy)?.set_liquidity_cap(*cap);
            String::new()
        }
    };
    Ok(summary)
}
