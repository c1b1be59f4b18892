/// Quantity of the pool's underlying asset, in the asset's smallest unit.
pub type Assets = u128;

/// Quantity of accounting units (shares).
pub type Units = u128;

/// Basis points: 1/100 of a percent.
pub type Bps = u16;

/// 100% expressed in basis points.
pub const MAX_BPS: Bps = 10_000;
