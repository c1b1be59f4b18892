//! Donation-aware multi-strategy capital allocator.
//!
//! Depositors receive units against a pool of one asset spread over several
//! strategies. The pool keeps an idle buffer, steers deployed capital toward
//! target weights, drains strategies in withdrawal-queue order when idle runs
//! short, and attributes realized profit and loss to a donation holder so
//! ordinary holders' unit counts never change from performance.

pub mod engine;
pub mod error;
pub mod math;
pub mod model;
pub mod simulate;
pub mod strategies;
pub mod validate;

pub use engine::{Pool, SharedPool};
pub use error::PoolError;
pub use model::{Assets, Bps, HolderId, PoolConfig, StrategyConfig, Units};
pub use strategies::{SimulatedStrategy, StrategyAdapter};
