//! Explorer configuration: TOML file with defaults, plus the mining pool
//! table used for coinbase attribution.

use std::collections::BTreeMap;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use chain_core::{Network, Params};

use crate::error::{ExplorerError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub network: String,
    /// Working directory: database and pool table live under it by default.
    pub prefix: PathBuf,
    pub db_path: Option<PathBuf>,
    pub node: NodeConfig,
    pub http: HttpConfig,
    pub pools_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NodeConfig {
    pub url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub api_key: Option<String>,
    pub no_auth: bool,
    pub cors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: "main".to_string(),
            prefix: PathBuf::from("./data"),
            db_path: None,
            node: NodeConfig::default(),
            http: HttpConfig::default(),
            pools_file: None,
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:12037".to_string(),
            api_key: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            api_key: None,
            no_auth: false,
            cors: false,
        }
    }
}

impl Config {
    /// Load from a TOML file, falling back to defaults when it is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| ExplorerError::Input(format!("bad config file: {e}")))
    }

    pub fn network(&self) -> Result<Network> {
        Ok(Network::from_str(&self.network)?)
    }

    pub fn params(&self) -> Result<Params> {
        Ok(Params::for_network(self.network()?))
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.prefix.join("explorer.db"))
    }

    /// Auth is on only when a key is configured, `no-auth` is unset, and the
    /// listener is not loopback-only.
    pub fn auth_enabled(&self) -> bool {
        if self.http.no_auth || self.http.api_key.is_none() {
            return false;
        }
        match IpAddr::from_str(&self.http.host) {
            Ok(addr) => !addr.is_loopback(),
            Err(_) => true,
        }
    }

    pub fn load_pools(&self) -> Result<PoolTable> {
        let Some(path) = &self.pools_file else {
            return Ok(PoolTable::default());
        };
        let content = fs::read_to_string(path)?;
        let pools: BTreeMap<String, PoolEntry> = toml::from_str(&content)
            .map_err(|e| ExplorerError::Input(format!("bad pools file: {e}")))?;
        Ok(PoolTable { pools })
    }
}

/// Known mining pool: payout addresses plus a homepage link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PoolEntry {
    pub addresses: Vec<String>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default)]
pub struct PoolTable {
    pools: BTreeMap<String, PoolEntry>,
}

impl PoolTable {
    pub fn new(pools: BTreeMap<String, PoolEntry>) -> Self {
        Self { pools }
    }

    /// First pool whose address list contains the coinbase address.
    pub fn attribute(&self, address_hash: &str) -> Option<(&str, &PoolEntry)> {
        self.pools
            .iter()
            .find(|(_, entry)| entry.addresses.iter().any(|a| a == address_hash))
            .map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn get(&self, name: &str) -> Option<&PoolEntry> {
        self.pools.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_loopback_no_auth() {
        let config = Config::default();
        assert!(!config.auth_enabled());
        assert_eq!(config.db_path(), PathBuf::from("./data/explorer.db"));
    }

    #[test]
    fn auth_requires_key_and_public_host() {
        let mut config = Config::default();
        config.http.api_key = Some("hunter2".to_string());
        assert!(!config.auth_enabled(), "loopback disables auth");

        config.http.host = "0.0.0.0".to_string();
        assert!(config.auth_enabled());

        config.http.no_auth = true;
        assert!(!config.auth_enabled());
    }

    #[test]
    fn pool_attribution_first_match_wins() {
        let mut pools = BTreeMap::new();
        pools.insert(
            "f2pool".to_string(),
            PoolEntry {
                addresses: vec!["aa".repeat(20)],
                url: "https://f2pool.com".to_string(),
            },
        );
        pools.insert(
            "poolin".to_string(),
            PoolEntry {
                addresses: vec!["aa".repeat(20), "bb".repeat(20)],
                url: "https://poolin.com".to_string(),
            },
        );
        let table = PoolTable::new(pools);

        let (name, _) = table.attribute(&"aa".repeat(20)).unwrap();
        assert_eq!(name, "f2pool");
        let (name, _) = table.attribute(&"bb".repeat(20)).unwrap();
        assert_eq!(name, "poolin");
        assert!(table.attribute("cc").is_none());
    }
}
