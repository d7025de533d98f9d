//!
//! # chain-core
//!
//! Handshake chain primitives: blocks, transactions, covenants, network
//! parameters and name rules. These types mirror the wire shapes the upstream
//! full node serves; no consensus validation happens here.
//!

pub mod block;
pub mod covenant;
pub mod errors;
pub mod hash;
pub mod params;
pub mod rules;
pub mod tx;

pub use block::{Block, BlockHeader, ChainEntry};
pub use covenant::{Covenant, CovenantType};
pub use errors::ChainError;
pub use hash::{Hash, ZERO_HASH};
pub use params::{get_reward, Network, Params};
pub use tx::{Address, Input, Outpoint, Output, Transaction};

/// Number of dollarydoos (base units) in one HNS.
pub const COIN: u64 = 1_000_000;

/// Seconds in a UTC day, used for summary bucketing.
pub const DAY: u64 = 86_400;
