//! Checked integer arithmetic for unit/asset conversion.
//!
//! All ledger math is integer. Every helper returns `None` on overflow or
//! division by zero so callers can surface it as an error instead of panicking.

use crate::model::{Assets, Bps, MAX_BPS};

/// `a * b / denominator`, rounded down.
pub fn mul_div_down(a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    a.checked_mul(b)?.checked_div(denominator)
}

/// `a * b / denominator`, rounded up.
pub fn mul_div_up(a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let product = a.checked_mul(b)?;
    let quotient = product / denominator;
    if product % denominator == 0 {
        Some(quotient)
    } else {
        quotient.checked_add(1)
    }
}

/// Portion of `amount` corresponding to `bps` basis points, rounded down.
pub fn bps_of(amount: Assets, bps: Bps) -> Option<Assets> {
    mul_div_down(amount, u128::from(bps), u128::from(MAX_BPS))
}

/// Sum of a weight vector plus the idle target, widened so it cannot overflow.
pub fn weight_sum(idle_bps: Bps, targets: &[Bps]) -> u32 {
    u32::from(idle_bps) + targets.iter().map(|&b| u32::from(b)).sum::<u32>()
}
