use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ChainError;
use crate::COIN;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Main,
    Testnet,
    Regtest,
}

impl Network {
    /// Bech32 human-readable prefix for addresses on this network.
    pub fn address_hrp(&self) -> &'static str {
        match self {
            Self::Main => "hs",
            Self::Testnet => "ts",
            Self::Regtest => "rs",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Testnet => "testnet",
            Self::Regtest => "regtest",
        }
    }
}

impl FromStr for Network {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" | "mainnet" => Ok(Self::Main),
            "testnet" => Ok(Self::Testnet),
            "regtest" => Ok(Self::Regtest),
            other => Err(ChainError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Consensus parameters the explorer depends on: auction phase lengths,
/// rollout schedule and the subsidy curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    pub network: Network,
    pub tree_interval: u32,
    pub bidding_period: u32,
    pub reveal_period: u32,
    pub rollout_interval: u32,
    pub claim_period: u32,
    pub renewal_window: u32,
    pub halving_interval: u32,
    pub base_reward: u64,
}

impl Params {
    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Main => Self {
                network,
                tree_interval: 36,
                bidding_period: 720,
                reveal_period: 1_440,
                rollout_interval: 1_008,
                claim_period: 210_240,
                renewal_window: 105_120,
                halving_interval: 170_000,
                base_reward: 2_000 * COIN,
            },
            Network::Testnet => Self {
                network,
                tree_interval: 18,
                bidding_period: 50,
                reveal_period: 100,
                rollout_interval: 144,
                claim_period: 29_200,
                renewal_window: 14_600,
                halving_interval: 170_000,
                base_reward: 2_000 * COIN,
            },
            Network::Regtest => Self {
                network,
                tree_interval: 5,
                bidding_period: 5,
                reveal_period: 10,
                rollout_interval: 2,
                claim_period: 300,
                renewal_window: 150,
                halving_interval: 2_500,
                base_reward: 2_000 * COIN,
            },
        }
    }

    /// Blocks between an OPEN and the start of bidding.
    pub fn open_period(&self) -> u32 {
        self.tree_interval + 1
    }

    /// Full auction length from OPEN to close.
    pub fn auction_period(&self) -> u32 {
        self.open_period() + self.bidding_period + self.reveal_period
    }

    pub fn reward(&self, height: u32) -> u64 {
        get_reward(height, self.halving_interval, self.base_reward)
    }
}

/// Coinbase subsidy at `height`: the base reward halved every interval.
pub fn get_reward(height: u32, halving_interval: u32, base_reward: u64) -> u64 {
    let halvings = height / halving_interval;
    if halvings >= 64 {
        return 0;
    }
    base_reward >> halvings
}
