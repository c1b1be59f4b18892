use crate::error::PoolError;
use crate::math::mul_div_down;
use crate::model::{Assets, HolderId, Units};

use super::ledger::ShareLedger;

/// Profit and loss attribution to the donation holder.
///
/// Holds the pool-wide baseline: the managed-asset value as of the last report,
/// moved by deposits and withdrawals so that only performance shows up as a delta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonationAccounting {
    baseline: Assets,
}

/// Result of settling one valuation delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settlement {
    pub previous_baseline: Assets,
    pub current: Assets,
    pub profit: Assets,
    pub loss: Assets,
    pub units_minted: Units,
    pub units_burned: Units,
}

impl DonationAccounting {
    pub fn baseline(&self) -> Assets {
        self.baseline
    }

    pub(crate) fn restore(&mut self, baseline: Assets) {
        self.baseline = baseline;
    }

    /// Assets entered the pool through a deposit or mint.
    pub fn record_inflow(&mut self, assets: Assets) -> Result<(), PoolError> {
        self.baseline = self.baseline.checked_add(assets).ok_or(PoolError::Overflow)?;
        Ok(())
    }

    /// Assets left the pool through a withdrawal or redemption.
    pub fn record_outflow(&mut self, assets: Assets) {
        // A pending loss can leave the baseline below what was actually paid out.
        self.baseline = self.baseline.saturating_sub(assets);
    }

    /// Compare `current` managed assets with the baseline and mint or burn
    /// donation units so ordinary holders keep their per-unit claim, then move
    /// the baseline to `current`.
    ///
    /// Profit mints `profit * total_units / baseline` units (1:1 while the pool
    /// has no units or no baseline). Loss burns the units equivalent of the loss
    /// at the post-loss price, capped at what the donation holder owns. Losses
    /// beyond that stay in the price.
    pub fn settle(
        &mut self,
        current: Assets,
        ledger: &mut ShareLedger,
        donation_holder: &HolderId,
    ) -> Result<Settlement, PoolError> {
        let previous = self.baseline;
        let total_units = ledger.total_units();
        let mut settlement = Settlement {
            previous_baseline: previous,
            current,
            ..Default::default()
        };

        if current > previous {
            let profit = current - previous;
            let minted = if total_units == 0 || previous == 0 {
                profit
            } else {
                mul_div_down(profit, total_units, previous).ok_or(PoolError::Overflow)?
            };
            ledger.mint(donation_holder, minted)?;
            settlement.profit = profit;
            settlement.units_minted = minted;
        } else if current < previous {
            let loss = previous - current;
            let owned = ledger.balance_of(donation_holder);
            let equivalent = if current == 0 {
                owned
            } else {
                mul_div_down(loss, total_units, current).ok_or(PoolError::Overflow)?
            };
            let burned = equivalent.min(owned);
            ledger.burn(donation_holder, burned)?;
            settlement.loss = loss;
            settlement.units_burned = burned;
        }

        self.baseline = current;
        Ok(settlement)
    }
}
