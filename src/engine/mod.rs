pub mod donation;
pub mod events;
pub mod invariants;
pub mod ledger;
pub mod queue;
pub mod rebalance;
pub mod shared;
pub mod strategy;
mod txn;

use tracing::info;

use crate::error::PoolError;
use crate::model::{Assets, Bps, HolderId, PoolConfig, Units};
use crate::strategies::StrategyAdapter;
use crate::validate::{self, ValidationError, check_targets};

use donation::DonationAccounting;
use events::{PoolEvent, ReportOutcome};
use ledger::ShareLedger;
use queue::WithdrawalQueue;
use strategy::{StrategyEntry, StrategyView, Valuations};
use txn::Movement;

pub use invariants::InvariantViolation;
pub use shared::SharedPool;

/// Custodial pool: one asset, a fixed set of strategies, unit accounting with
/// performance attributed to a donation holder.
///
/// Every mutating operation is atomic: it either completes or leaves the ledger
/// as it was (see `transact`). Deposits and withdrawals settle pending profit
/// or loss before they are priced and rebalance before they return; `report`
/// settles on demand.
pub struct Pool {
    name: String,
    asset: String,
    donation_holder: HolderId,
    idle: Assets,
    idle_target_bps: Bps,
    strategies: Vec<StrategyEntry>,
    queue: WithdrawalQueue,
    ledger: ShareLedger,
    donation: DonationAccounting,
    events: Vec<PoolEvent>,

    /// Set while `transact` runs; nested operations on the same pool are rejected.
    in_progress: Option<&'static str>,
    journal: Vec<Movement>,
}

impl Pool {
    /// Build a pool from a validated config and one adapter per configured strategy.
    pub fn new(config: PoolConfig, adapters: Vec<Box<dyn StrategyAdapter>>) -> Result<Self, PoolError> {
        validate::validate(&config)?;
        if adapters.len() != config.strategies.len() {
            return Err(PoolError::Configuration(vec![ValidationError::AdapterCount {
                expected: config.strategies.len(),
                got: adapters.len(),
            }]));
        }

        let queue = WithdrawalQueue::new(config.resolved_queue(), config.strategies.len())?;
        let mut strategies = Vec::with_capacity(adapters.len());
        for (sc, adapter) in config.strategies.into_iter().zip(adapters) {
            let last_valuation = adapter.valuation().map_err(|e| PoolError::AdapterFailure {
                strategy: sc.name.clone(),
                reason: format!("initial valuation: {e:#}"),
            })?;
            strategies.push(StrategyEntry {
                name: sc.name,
                adapter,
                target_bps: sc.target_bps,
                last_valuation,
            });
        }

        info!(
            pool = %config.name,
            asset = %config.asset,
            idle_target_bps = config.idle_target_bps,
            queue = ?queue,
            "pool created"
        );

        Ok(Self {
            name: config.name,
            asset: config.asset,
            donation_holder: config.donation_holder,
            idle: 0,
            idle_target_bps: config.idle_target_bps,
            strategies,
            queue,
            ledger: ShareLedger::default(),
            donation: DonationAccounting::default(),
            events: Vec::new(),
            in_progress: None,
            journal: Vec::new(),
        })
    }

    // ── Share ledger operations ─────────────────────────────────────

    /// Deposit `assets` and mint units to `receiver`. Returns units minted.
    ///
    /// Profit or loss accrued since the last report is settled first, so the
    /// depositor buys in at the post-settlement price.
    pub fn deposit(&mut self, assets: Assets, receiver: &HolderId) -> Result<Units, PoolError> {
        self.transact("deposit", |pool| {
            require_nonzero(assets, "deposit")?;
            pool.check_receiver(receiver, "deposit")?;
            let total = pool.settle_pending()?;
            let units = pool.ledger.units_for_deposit(assets, total)?;
            if units == 0 {
                return Err(PoolError::ZeroAmount { operation: "deposit" });
            }
            pool.credit(receiver, assets, units)?;
            Ok(units)
        })
    }

    /// Mint exactly `units` to `receiver`. Returns the assets charged.
    pub fn mint(&mut self, units: Units, receiver: &HolderId) -> Result<Assets, PoolError> {
        self.transact("mint", |pool| {
            require_nonzero(units, "mint")?;
            pool.check_receiver(receiver, "mint")?;
            let total = pool.settle_pending()?;
            let assets = pool.ledger.assets_for_mint(units, total)?;
            pool.credit(receiver, assets, units)?;
            Ok(assets)
        })
    }

    /// Withdraw exactly `assets` to `receiver`, burning units from `owner`.
    /// Returns units burned.
    pub fn withdraw(
        &mut self,
        assets: Assets,
        receiver: &HolderId,
        owner: &HolderId,
    ) -> Result<Units, PoolError> {
        self.transact("withdraw", |pool| {
            require_nonzero(assets, "withdraw")?;
            check_identity(receiver, "receiver")?;
            check_identity(owner, "owner")?;
            let total = pool.settle_pending()?;
            if assets > total {
                return Err(PoolError::InsufficientLiquidity {
                    requested: assets,
                    available: total,
                });
            }
            let units = pool.ledger.units_for_withdraw(assets, total)?;
            pool.debit(owner, receiver, assets, units)?;
            Ok(units)
        })
    }

    /// Redeem `units` from `owner`, paying assets to `receiver`. Returns assets paid.
    pub fn redeem(
        &mut self,
        units: Units,
        receiver: &HolderId,
        owner: &HolderId,
    ) -> Result<Assets, PoolError> {
        self.transact("redeem", |pool| {
            require_nonzero(units, "redeem")?;
            check_identity(receiver, "receiver")?;
            check_identity(owner, "owner")?;
            let total = pool.settle_pending()?;
            let assets = pool.ledger.assets_for_redeem(units, total)?;
            if assets == 0 {
                return Err(PoolError::ZeroAmount { operation: "redeem" });
            }
            pool.debit(owner, receiver, assets, units)?;
            Ok(assets)
        })
    }

    fn check_receiver(&self, receiver: &HolderId, operation: &'static str) -> Result<(), PoolError> {
        check_identity(receiver, "receiver")?;
        if *receiver == self.donation_holder {
            return Err(PoolError::DonationHolderReserved {
                holder: receiver.to_string(),
                operation,
            });
        }
        Ok(())
    }

    /// Take `assets` in, mint `units`, then push the surplus out to strategies.
    fn credit(&mut self, receiver: &HolderId, assets: Assets, units: Units) -> Result<(), PoolError> {
        self.idle = self.idle.checked_add(assets).ok_or(PoolError::Overflow)?;
        self.ledger.mint(receiver, units)?;
        self.donation.record_inflow(assets)?;
        info!(receiver = %receiver, assets, units, total_units = self.ledger.total_units(), "deposit");
        self.events.push(PoolEvent::Deposit {
            receiver: receiver.clone(),
            assets,
            units,
        });
        self.run_rebalance()?;
        Ok(())
    }

    /// Free `assets` of idle capital, burn `units`, pay out, then refill the buffer.
    fn debit(
        &mut self,
        owner: &HolderId,
        receiver: &HolderId,
        assets: Assets,
        units: Units,
    ) -> Result<(), PoolError> {
        let owned = self.ledger.balance_of(owner);
        if owned < units {
            return Err(PoolError::InsufficientUnits {
                holder: owner.to_string(),
                required: units,
                available: owned,
            });
        }

        self.ensure_idle(assets)?;
        self.ledger.burn(owner, units)?;
        self.idle -= assets;
        self.donation.record_outflow(assets);
        info!(owner = %owner, receiver = %receiver, assets, units, idle = self.idle, "withdraw");
        self.events.push(PoolEvent::Withdraw {
            receiver: receiver.clone(),
            owner: owner.clone(),
            assets,
            units,
        });
        self.run_rebalance()?;
        Ok(())
    }

    // ── Donation accounting ─────────────────────────────────────────

    /// Settle profit or loss since the last baseline against the donation holder.
    ///
    /// A strategy whose valuation cannot be read counts at its last known value.
    pub fn report(&mut self) -> Result<ReportOutcome, PoolError> {
        self.transact("report", |pool| {
            let valuations = pool.refresh_valuations()?;
            let outcome = pool.settle(&valuations)?;
            info!(
                baseline = outcome.previous_baseline,
                current = outcome.current,
                profit = outcome.profit,
                loss = outcome.loss,
                minted = outcome.units_minted,
                burned = outcome.units_burned,
                stale = outcome.stale.len(),
                "report"
            );
            pool.events.push(PoolEvent::Report(outcome.clone()));
            Ok(outcome)
        })
    }

    fn settle(&mut self, valuations: &Valuations) -> Result<ReportOutcome, PoolError> {
        let settlement =
            self.donation
                .settle(valuations.total, &mut self.ledger, &self.donation_holder)?;
        Ok(ReportOutcome {
            previous_baseline: settlement.previous_baseline,
            current: settlement.current,
            profit: settlement.profit,
            loss: settlement.loss,
            units_minted: settlement.units_minted,
            units_burned: settlement.units_burned,
            stale: valuations
                .stale
                .iter()
                .map(|&i| self.strategies[i].name.clone())
                .collect(),
        })
    }

    /// Refresh valuations and settle any delta against the baseline before a
    /// deposit or withdrawal is priced. Returns the total to price against.
    fn settle_pending(&mut self) -> Result<Assets, PoolError> {
        let valuations = self.refresh_valuations()?;
        let outcome = self.settle(&valuations)?;
        if outcome.profit > 0 || outcome.loss > 0 {
            info!(
                profit = outcome.profit,
                loss = outcome.loss,
                minted = outcome.units_minted,
                burned = outcome.units_burned,
                "pending performance settled"
            );
            self.events.push(PoolEvent::Report(outcome));
        }
        Ok(valuations.total)
    }

    // ── Governance ──────────────────────────────────────────────────

    /// Replace the idle target and every strategy weight at once.
    /// Does not move capital; call `rebalance` for that.
    pub fn set_targets(&mut self, idle_target_bps: Bps, targets: Vec<Bps>) -> Result<(), PoolError> {
        self.transact("set_targets", |pool| {
            let errors = check_targets(idle_target_bps, &targets, pool.strategies.len());
            if !errors.is_empty() {
                return Err(PoolError::Configuration(errors));
            }
            pool.idle_target_bps = idle_target_bps;
            for (entry, &bps) in pool.strategies.iter_mut().zip(&targets) {
                entry.target_bps = bps;
            }
            info!(idle_target_bps, targets = ?targets, "targets updated");
            pool.events.push(PoolEvent::TargetsUpdated {
                idle_target_bps,
                targets,
            });
            Ok(())
        })
    }

    /// Replace the withdrawal queue. Must be a permutation of the strategy indices.
    pub fn set_withdrawal_queue(&mut self, order: Vec<usize>) -> Result<(), PoolError> {
        self.transact("set_withdrawal_queue", |pool| {
            pool.queue = WithdrawalQueue::new(order.clone(), pool.strategies.len())?;
            info!(queue = ?order, "withdrawal queue updated");
            pool.events.push(PoolEvent::QueueUpdated { queue: order });
            Ok(())
        })
    }

    // ── Views ───────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn donation_holder(&self) -> &HolderId {
        &self.donation_holder
    }

    pub fn idle_balance(&self) -> Assets {
        self.idle
    }

    pub fn idle_target_bps(&self) -> Bps {
        self.idle_target_bps
    }

    pub fn total_units(&self) -> Units {
        self.ledger.total_units()
    }

    pub fn balance_of(&self, holder: &HolderId) -> Units {
        self.ledger.balance_of(holder)
    }

    pub fn holders(&self) -> impl Iterator<Item = (&HolderId, Units)> {
        self.ledger.holders()
    }

    /// Managed assets as of the last report, adjusted for deposits and withdrawals since.
    pub fn baseline(&self) -> Assets {
        self.donation.baseline()
    }

    /// Idle plus every strategy's valuation (last known value where a read fails).
    pub fn total_managed_assets(&self) -> Result<Assets, PoolError> {
        self.peek_total()
    }

    pub fn strategies(&self) -> Vec<StrategyView> {
        self.strategies
            .iter()
            .enumerate()
            .map(|(index, s)| StrategyView {
                index,
                name: s.name.clone(),
                target_bps: s.target_bps,
                last_valuation: s.last_valuation,
            })
            .collect()
    }

    pub fn withdrawal_queue(&self) -> &[usize] {
        &self.queue
    }

    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    /// Drain the audit trail.
    pub fn take_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Previews ────────────────────────────────────────────────────

    // Previews price against the ledger as it stands once pending profit or
    // loss is settled, which is what the next deposit or withdrawal sees.

    fn settled_view(&self) -> Result<(ShareLedger, Assets), PoolError> {
        let total = self.peek_total()?;
        let mut ledger = self.ledger.clone();
        let mut donation = self.donation.clone();
        donation.settle(total, &mut ledger, &self.donation_holder)?;
        Ok((ledger, total))
    }

    /// Units `assets` is worth at the current price, rounded down.
    pub fn convert_to_units(&self, assets: Assets) -> Result<Units, PoolError> {
        let (ledger, total) = self.settled_view()?;
        ledger.units_for_deposit(assets, total)
    }

    /// Assets `units` are worth at the current price, rounded down.
    pub fn convert_to_assets(&self, units: Units) -> Result<Assets, PoolError> {
        let (ledger, total) = self.settled_view()?;
        ledger.assets_for_redeem(units, total)
    }

    pub fn preview_deposit(&self, assets: Assets) -> Result<Units, PoolError> {
        self.convert_to_units(assets)
    }

    pub fn preview_mint(&self, units: Units) -> Result<Assets, PoolError> {
        let (ledger, total) = self.settled_view()?;
        ledger.assets_for_mint(units, total)
    }

    pub fn preview_withdraw(&self, assets: Assets) -> Result<Units, PoolError> {
        let (ledger, total) = self.settled_view()?;
        ledger.units_for_withdraw(assets, total)
    }

    pub fn preview_redeem(&self, units: Units) -> Result<Assets, PoolError> {
        self.convert_to_assets(units)
    }

    /// Most assets `owner` could withdraw, ignoring strategy liquidity limits.
    pub fn max_withdraw(&self, owner: &HolderId) -> Result<Assets, PoolError> {
        let (ledger, total) = self.settled_view()?;
        ledger.assets_for_redeem(ledger.balance_of(owner), total)
    }

    /// Units `owner` will hold once pending profit or loss is settled.
    pub fn max_redeem(&self, owner: &HolderId) -> Result<Units, PoolError> {
        Ok(self.settled_view()?.0.balance_of(owner))
    }
}

fn require_nonzero(amount: u128, operation: &'static str) -> Result<(), PoolError> {
    if amount == 0 {
        return Err(PoolError::ZeroAmount { operation });
    }
    Ok(())
}

fn check_identity(holder: &HolderId, field: &'static str) -> Result<(), PoolError> {
    if holder.is_valid() {
        Ok(())
    } else {
        Err(PoolError::InvalidIdentity { field })
    }
}
