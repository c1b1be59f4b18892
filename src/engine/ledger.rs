use std::collections::BTreeMap;

use crate::error::PoolError;
use crate::math::{mul_div_down, mul_div_up};
use crate::model::{Assets, HolderId, Units};

/// Per-holder unit balances plus the unit supply.
///
/// `mint` and `burn` keep `sum(balances) == total_units`; a holder whose balance
/// returns to zero is dropped from the map.
///
/// Conversions take the pool's current total managed assets as input. With no
/// units outstanding the price is 1 (one unit per asset). Every conversion
/// rounds in the pool's favour:
///
/// | Operation | Convert          | Rounding |
/// |-----------|------------------|----------|
/// | deposit   | assets → units   | down     |
/// | mint      | units → assets   | up       |
/// | withdraw  | assets → units   | up       |
/// | redeem    | units → assets   | down     |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareLedger {
    total_units: Units,
    balances: BTreeMap<HolderId, Units>,
}

impl ShareLedger {
    pub fn total_units(&self) -> Units {
        self.total_units
    }

    pub fn balance_of(&self, holder: &HolderId) -> Units {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    pub fn holders(&self) -> impl Iterator<Item = (&HolderId, Units)> {
        self.balances.iter().map(|(h, &u)| (h, u))
    }

    /// Sum of every holder balance. `None` on overflow.
    pub fn sum_of_balances(&self) -> Option<Units> {
        self.balances
            .values()
            .try_fold(0u128, |acc, &units| acc.checked_add(units))
    }

    pub fn mint(&mut self, holder: &HolderId, units: Units) -> Result<(), PoolError> {
        if units == 0 {
            return Ok(());
        }
        let total = self.total_units.checked_add(units).ok_or(PoolError::Overflow)?;
        let balance = self
            .balance_of(holder)
            .checked_add(units)
            .ok_or(PoolError::Overflow)?;
        self.total_units = total;
        self.balances.insert(holder.clone(), balance);
        Ok(())
    }

    pub fn burn(&mut self, holder: &HolderId, units: Units) -> Result<(), PoolError> {
        if units == 0 {
            return Ok(());
        }
        let available = self.balance_of(holder);
        if available < units {
            return Err(PoolError::InsufficientUnits {
                holder: holder.to_string(),
                required: units,
                available,
            });
        }
        let remaining = available - units;
        if remaining == 0 {
            self.balances.remove(holder);
        } else {
            self.balances.insert(holder.clone(), remaining);
        }
        self.total_units -= units;
        Ok(())
    }

    // ── Conversions ──────────────────────────────────────────────────

    /// Units minted for depositing `assets`.
    pub fn units_for_deposit(&self, assets: Assets, total_assets: Assets) -> Result<Units, PoolError> {
        if self.total_units == 0 {
            return Ok(assets);
        }
        if total_assets == 0 {
            return Err(PoolError::Insolvent);
        }
        mul_div_down(assets, self.total_units, total_assets).ok_or(PoolError::Overflow)
    }

    /// Assets charged for minting exactly `units`.
    pub fn assets_for_mint(&self, units: Units, total_assets: Assets) -> Result<Assets, PoolError> {
        if self.total_units == 0 {
            return Ok(units);
        }
        if total_assets == 0 {
            return Err(PoolError::Insolvent);
        }
        mul_div_up(units, total_assets, self.total_units).ok_or(PoolError::Overflow)
    }

    /// Units burned for withdrawing exactly `assets`.
    pub fn units_for_withdraw(&self, assets: Assets, total_assets: Assets) -> Result<Units, PoolError> {
        if self.total_units == 0 {
            return Ok(assets);
        }
        if total_assets == 0 {
            return Err(PoolError::InsufficientLiquidity {
                requested: assets,
                available: 0,
            });
        }
        mul_div_up(assets, self.total_units, total_assets).ok_or(PoolError::Overflow)
    }

    /// Assets paid for redeeming `units`.
    pub fn assets_for_redeem(&self, units: Units, total_assets: Assets) -> Result<Assets, PoolError> {
        if self.total_units == 0 {
            return Ok(units);
        }
        mul_div_down(units, total_assets, self.total_units).ok_or(PoolError::Overflow)
    }
}
