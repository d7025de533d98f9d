//! Scripted in-memory chain used to drive the indexer and query engine.

// not every test binary exercises every helper
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use chain_core::{
    Address, Block, BlockHeader, ChainEntry, Covenant, CovenantType, Hash, Input, Outpoint,
    Output, Transaction, COIN,
};
use rpc_core::{
    ChainApi, ChainEvent, ChainTip, CoinView, GeoIp, MempoolInfo, NameState, NodeInfo, PeerInfo,
    RpcError, TxMeta, ViewCoin,
};

pub const BLOCK_INTERVAL: u64 = 600;
pub const GENESIS_TIME: u64 = 1_600_000_000 - 1_600_000_000 % 86_400;

pub fn addr(n: u8) -> Address {
    Address::new(0, hex::encode([n; 20]))
}

pub fn items_for(name: &str, cov: CovenantType, extra: Option<String>) -> Vec<String> {
    let name_hash = chain_core::rules::hash_name(name).to_hex();
    let mut items = vec![name_hash, "00000000".to_string()];
    match cov {
        CovenantType::Claim | CovenantType::Open | CovenantType::Bid => {
            items.push(hex::encode(name));
        }
        CovenantType::Reveal => items.push(extra.unwrap_or_else(|| "ee".repeat(32))),
        _ => {}
    }
    items
}

struct State {
    chain: Vec<(ChainEntry, Block)>,
    name_states: HashMap<Hash, NameState>,
}

pub struct MockChain {
    state: Mutex<State>,
    next_hash: AtomicU64,
    events: broadcast::Sender<ChainEvent>,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            state: Mutex::new(State {
                chain: Vec::new(),
                name_states: HashMap::new(),
            }),
            next_hash: AtomicU64::new(1),
            events,
        })
    }

    pub fn fresh_hash(&self) -> Hash {
        let n = self.next_hash.fetch_add(1, Ordering::SeqCst);
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&n.to_le_bytes());
        Hash::new(bytes)
    }

    pub fn coinbase_tx(&self, miner: &Address, value: u64) -> Transaction {
        Transaction {
            hash: self.fresh_hash(),
            inputs: vec![Input::new(Outpoint::null(), u32::MAX)],
            outputs: vec![Output::new(value, miner.clone(), Covenant::none())],
            locktime: 0,
        }
    }

    /// Single-output transaction carrying a name covenant.
    pub fn covenant_tx(
        &self,
        spend: Option<Outpoint>,
        value: u64,
        owner: &Address,
        cov: CovenantType,
        name: &str,
        nonce: Option<String>,
    ) -> Transaction {
        let inputs = match spend {
            Some(prevout) => vec![Input::new(prevout, u32::MAX)],
            None => vec![],
        };
        Transaction {
            hash: self.fresh_hash(),
            inputs,
            outputs: vec![Output::new(
                value,
                owner.clone(),
                Covenant::new(cov, items_for(name, cov, nonce)),
            )],
            locktime: 0,
        }
    }

    /// Plain value transfer spending `prevout`.
    pub fn spend_tx(&self, prevout: Outpoint, value: u64, to: &Address) -> Transaction {
        Transaction {
            hash: self.fresh_hash(),
            inputs: vec![Input::new(prevout, u32::MAX)],
            outputs: vec![Output::new(value, to.clone(), Covenant::none())],
            locktime: 0,
        }
    }

    /// Append a block containing a coinbase plus `txs`. Returns its entry.
    pub fn push_block(&self, miner: &Address, txs: Vec<Transaction>) -> ChainEntry {
        self.push_block_full(miner, txs, None, 2_000 * COIN)
    }

    pub fn push_block_at(&self, miner: &Address, txs: Vec<Transaction>, time: u64) -> ChainEntry {
        self.push_block_full(miner, txs, Some(time), 2_000 * COIN)
    }

    pub fn push_block_full(
        &self,
        miner: &Address,
        txs: Vec<Transaction>,
        time: Option<u64>,
        coinbase_value: u64,
    ) -> ChainEntry {
        let mut state = self.state.lock().unwrap();

        let height = state.chain.len() as u32;
        let prev_block = state
            .chain
            .last()
            .map(|(e, _)| e.hash)
            .unwrap_or_default();
        let time = time.unwrap_or(GENESIS_TIME + u64::from(height) * BLOCK_INTERVAL);

        let mut block_txs = vec![self.coinbase_tx(miner, coinbase_value)];
        block_txs.extend(txs);

        let hash = self.fresh_hash();
        let header = BlockHeader {
            hash,
            version: 0,
            prev_block,
            merkle_root: Hash::default(),
            tree_root: Hash::default(),
            time,
            bits: 0x1d00_ffff,
            nonce: 0,
        };
        let entry = ChainEntry {
            height,
            hash,
            prev_block,
            merkle_root: Hash::default(),
            time,
            bits: 0x1d00_ffff,
            chainwork: format!("{:064x}", (u64::from(height) + 1) * 0x1_0000),
        };

        state.chain.push((entry.clone(), Block::new(header, block_txs)));
        entry
    }

    /// Drop every block above `height`, simulating the stale fork side.
    pub fn truncate(&self, height: u32) {
        let mut state = self.state.lock().unwrap();
        state.chain.truncate(height as usize + 1);
    }

    pub fn set_name_state(&self, ns: NameState) {
        let mut state = self.state.lock().unwrap();
        state.name_states.insert(ns.name_hash, ns);
    }

    pub fn tip_sync(&self) -> ChainTip {
        let state = self.state.lock().unwrap();
        let (entry, _) = state.chain.last().expect("empty chain");
        ChainTip {
            height: entry.height,
            hash: entry.hash,
        }
    }

    /// Tip descriptor for an ancestor block, as a `chain reset` would carry.
    pub fn tip_at(&self, height: u32) -> ChainTip {
        let state = self.state.lock().unwrap();
        let (entry, _) = &state.chain[height as usize];
        ChainTip {
            height: entry.height,
            hash: entry.hash,
        }
    }

    pub fn block_txid(&self, height: u32, index: usize) -> Hash {
        let state = self.state.lock().unwrap();
        let (_, block) = &state.chain[height as usize];
        block.txs[index].hash
    }

    fn resolve(state: &State, prevout: &Outpoint) -> Option<ViewCoin> {
        for (entry, block) in &state.chain {
            for tx in &block.txs {
                if tx.hash == prevout.hash {
                    let output = tx.outputs.get(prevout.index as usize)?;
                    return Some(ViewCoin {
                        value: output.value,
                        address: output.address.clone(),
                        covenant: output.covenant.clone(),
                        height: entry.height,
                        coinbase: tx.is_coinbase(),
                    });
                }
            }
        }
        None
    }

    fn view_for(state: &State, block: &Block) -> CoinView {
        let mut view = CoinView::default();
        for tx in &block.txs {
            for input in &tx.inputs {
                if input.prevout.is_null() {
                    continue;
                }
                if let Some(coin) = Self::resolve(state, &input.prevout) {
                    view.insert(input.prevout, coin);
                }
            }
        }
        view
    }
}

#[async_trait]
impl ChainApi for MockChain {
    async fn get_tip(&self) -> Result<ChainTip, RpcError> {
        Ok(self.tip_sync())
    }

    async fn get_entry(&self, height: u32) -> Result<Option<ChainEntry>, RpcError> {
        let state = self.state.lock().unwrap();
        Ok(state.chain.get(height as usize).map(|(e, _)| e.clone()))
    }

    async fn get_entry_by_hash(&self, hash: Hash) -> Result<Option<ChainEntry>, RpcError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .chain
            .iter()
            .find(|(e, _)| e.hash == hash)
            .map(|(e, _)| e.clone()))
    }

    async fn get_next_hash(&self, hash: Hash) -> Result<Option<Hash>, RpcError> {
        let state = self.state.lock().unwrap();
        let index = state.chain.iter().position(|(e, _)| e.hash == hash);
        Ok(index
            .and_then(|i| state.chain.get(i + 1))
            .map(|(e, _)| e.hash))
    }

    async fn get_block(&self, height: u32) -> Result<Option<Block>, RpcError> {
        let state = self.state.lock().unwrap();
        Ok(state.chain.get(height as usize).map(|(_, b)| b.clone()))
    }

    async fn get_block_by_hash(&self, hash: Hash) -> Result<Option<Block>, RpcError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .chain
            .iter()
            .find(|(_, b)| b.header.hash == hash)
            .map(|(_, b)| b.clone()))
    }

    async fn get_block_view(&self, block: &Block) -> Result<CoinView, RpcError> {
        let state = self.state.lock().unwrap();
        Ok(Self::view_for(&state, block))
    }

    async fn get_median_time(&self, entry: &ChainEntry) -> Result<u64, RpcError> {
        Ok(entry.time)
    }

    async fn get_name_state(&self, name_hash: Hash) -> Result<Option<NameState>, RpcError> {
        let state = self.state.lock().unwrap();
        Ok(state.name_states.get(&name_hash).cloned())
    }

    async fn get_tx_meta(&self, txid: Hash) -> Result<Option<TxMeta>, RpcError> {
        let state = self.state.lock().unwrap();
        for (entry, block) in &state.chain {
            for tx in &block.txs {
                if tx.hash == txid {
                    return Ok(Some(TxMeta {
                        tx: tx.clone(),
                        height: i64::from(entry.height),
                        block_hash: Some(entry.hash),
                        time: entry.time,
                    }));
                }
            }
        }
        Ok(None)
    }

    async fn get_meta_view(&self, meta: &TxMeta) -> Result<CoinView, RpcError> {
        let state = self.state.lock().unwrap();
        let mut view = CoinView::default();
        for input in &meta.tx.inputs {
            if input.prevout.is_null() {
                continue;
            }
            if let Some(coin) = Self::resolve(&state, &input.prevout) {
                view.insert(input.prevout, coin);
            }
        }
        Ok(view)
    }

    async fn get_node_info(&self) -> Result<NodeInfo, RpcError> {
        let tip = self.tip_sync();
        Ok(NodeInfo {
            version: "2.4.0".to_string(),
            agent: "/hsd-test/".to_string(),
            network: "regtest".to_string(),
            height: tip.height,
            progress: 1.0,
            connections: 8,
            uptime: 1_000,
            total_bytes_recv: 0,
            total_bytes_sent: 0,
        })
    }

    async fn get_mempool_info(&self) -> Result<MempoolInfo, RpcError> {
        Ok(MempoolInfo::default())
    }

    async fn get_mempool_txids(&self) -> Result<Vec<Hash>, RpcError> {
        Ok(Vec::new())
    }

    async fn get_mempool_by_address(&self, _address_hash: &str) -> Result<Vec<Hash>, RpcError> {
        Ok(Vec::new())
    }

    async fn get_peers(&self) -> Result<Vec<PeerInfo>, RpcError> {
        Ok(Vec::new())
    }

    async fn get_peers_location(&self) -> Result<Vec<GeoIp>, RpcError> {
        Ok(Vec::new())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChainEvent> {
        self.events.subscribe()
    }
}
