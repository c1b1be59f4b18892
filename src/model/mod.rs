pub mod amount;
pub mod config;
pub mod holder;

pub use amount::{Assets, Bps, MAX_BPS, Units};
pub use config::{PoolConfig, StrategyConfig};
pub use holder::HolderId;
