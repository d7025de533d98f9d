//! WebSocket JSON-RPC client for the upstream Handshake node. One persistent
//! socket carries both request/response pairs and pushed chain events; the
//! socket task reconnects forever and emits `ChainEvent::Connect` after each
//! (re)subscribe so the indexer can close any gap.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use chain_core::{Block, ChainEntry, Hash};
use rpc_core::{
    ChainApi, ChainEvent, ChainTip, CoinView, GeoIp, MempoolInfo, NameState, NodeInfo, PeerInfo,
    RpcError, TxMeta,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: String,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcFrame {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Value,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

struct PendingCall {
    method: String,
    params: Value,
    respond: oneshot::Sender<Result<Value, RpcError>>,
}

pub struct HsdClient {
    calls: mpsc::Sender<PendingCall>,
    events: broadcast::Sender<ChainEvent>,
}

impl HsdClient {
    /// Spawn the socket task. Returns immediately; calls made before the
    /// first successful connect queue up.
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        let (calls_tx, calls_rx) = mpsc::channel(64);
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let task = SocketTask {
            url: url.into(),
            api_key,
            calls: calls_rx,
            events: events_tx.clone(),
        };
        tokio::spawn(task.run());

        Self {
            calls: calls_tx,
            events: events_tx,
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let (respond, rx) = oneshot::channel();
        self.calls
            .send(PendingCall {
                method: method.to_string(),
                params,
                respond,
            })
            .await
            .map_err(|_| RpcError::Network("node socket task gone".into()))?;

        let result = tokio::time::timeout(REQUEST_TIMEOUT, rx)
            .await
            .map_err(|_| RpcError::Timeout)?
            .map_err(|_| RpcError::Network("request dropped".into()))??;

        serde_json::from_value(result).map_err(|e| RpcError::Decode(e.to_string()))
    }
}

struct SocketTask {
    url: String,
    api_key: Option<String>,
    calls: mpsc::Receiver<PendingCall>,
    events: broadcast::Sender<ChainEvent>,
}

impl SocketTask {
    async fn run(mut self) {
        loop {
            match self.session().await {
                Ok(()) => return, // call channel closed, client dropped
                Err(e) => {
                    warn!("node socket lost: {e}; reconnecting");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }

    /// One socket lifetime: subscribe, then pump calls and frames until the
    /// connection breaks.
    async fn session(&mut self) -> Result<(), RpcError> {
        let (socket, _) = connect_async(&self.url)
            .await
            .map_err(|e| RpcError::Network(format!("connect failed: {e}")))?;
        let (mut sink, mut stream) = socket.split();

        let mut next_id: u64 = 1;
        let mut pending: HashMap<u64, oneshot::Sender<Result<Value, RpcError>>> = HashMap::new();

        // auth, then ask for the chain feed
        if let Some(key) = &self.api_key {
            send_request(&mut sink, 0, "auth", json!([key])).await?;
        }
        send_request(&mut sink, 0, "watch chain", json!([])).await?;

        info!("connected to node at {}", self.url);
        let events = self.events.clone();
        let _ = events.send(ChainEvent::Connect);

        loop {
            tokio::select! {
                call = self.calls.recv() => {
                    let Some(call) = call else { return Ok(()) };
                    let id = next_id;
                    next_id += 1;
                    if let Err(e) = send_request(&mut sink, id, &call.method, call.params).await {
                        let _ = call.respond.send(Err(e));
                        continue;
                    }
                    pending.insert(id, call.respond);
                }
                frame = stream.next() => {
                    let frame = match frame {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Close(_))) | None => {
                            fail_pending(pending, "connection closed");
                            return Err(RpcError::Network("connection closed".into()));
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => {
                            fail_pending(pending, "socket error");
                            return Err(RpcError::Network(e.to_string()));
                        }
                    };
                    if let Some(parsed) = text_frame(&frame) {
                        handle_frame(&events, parsed, &mut pending);
                    }
                }
            }
        }
    }

}

fn handle_frame(
    events: &broadcast::Sender<ChainEvent>,
    frame: JsonRpcFrame,
    pending: &mut HashMap<u64, oneshot::Sender<Result<Value, RpcError>>>,
) {
    if let Some(id) = frame.id {
        let Some(respond) = pending.remove(&id) else {
            return;
        };
        let result = match frame.error {
            Some(err) => Err(RpcError::Node {
                code: err.code,
                message: err.message,
            }),
            None => Ok(frame.result),
        };
        let _ = respond.send(result);
        return;
    }

    if let Some(method) = &frame.method {
        match decode_event(method, &frame.params) {
            Ok(Some(event)) => {
                let _ = events.send(event);
            }
            Ok(None) => debug!(%method, "ignoring node notification"),
            Err(e) => error!(%method, "bad node notification: {e}"),
        }
    }
}

fn text_frame(text: &str) -> Option<JsonRpcFrame> {
    match serde_json::from_str(text) {
        Ok(frame) => Some(frame),
        Err(e) => {
            error!("unparseable node frame: {e}");
            None
        }
    }
}

fn decode_event(method: &str, params: &Value) -> Result<Option<ChainEvent>, RpcError> {
    #[derive(Deserialize)]
    struct BlockConnectParams {
        entry: ChainEntry,
        block: Block,
        #[serde(default)]
        view: CoinView,
    }

    #[derive(Deserialize)]
    struct ChainResetParams {
        tip: ChainTip,
    }

    match method {
        "block connect" => {
            let p: BlockConnectParams =
                serde_json::from_value(params.clone()).map_err(|e| RpcError::Decode(e.to_string()))?;
            Ok(Some(ChainEvent::BlockConnect {
                entry: p.entry,
                block: p.block,
                view: p.view,
            }))
        }
        "chain reset" => {
            let p: ChainResetParams =
                serde_json::from_value(params.clone()).map_err(|e| RpcError::Decode(e.to_string()))?;
            Ok(Some(ChainEvent::ChainReset { tip: p.tip }))
        }
        _ => Ok(None),
    }
}

async fn send_request<S>(
    sink: &mut S,
    id: u64,
    method: &str,
    params: Value,
) -> Result<(), RpcError>
where
    S: SinkExt<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let request = JsonRpcRequest {
        jsonrpc: "2.0",
        id,
        method: method.to_string(),
        params,
    };
    let text =
        serde_json::to_string(&request).map_err(|e| RpcError::Decode(e.to_string()))?;
    sink.send(Message::Text(text))
        .await
        .map_err(|e| RpcError::Network(format!("send failed: {e}")))
}

fn fail_pending(
    pending: HashMap<u64, oneshot::Sender<Result<Value, RpcError>>>,
    reason: &str,
) {
    for (_, respond) in pending {
        let _ = respond.send(Err(RpcError::Network(reason.to_string())));
    }
}

#[async_trait]
impl ChainApi for HsdClient {
    async fn get_tip(&self) -> Result<ChainTip, RpcError> {
        self.call("get tip", json!([])).await
    }

    async fn get_entry(&self, height: u32) -> Result<Option<ChainEntry>, RpcError> {
        self.call("get entry", json!([height])).await
    }

    async fn get_entry_by_hash(&self, hash: Hash) -> Result<Option<ChainEntry>, RpcError> {
        self.call("get entry by hash", json!([hash.to_hex()])).await
    }

    async fn get_next_hash(&self, hash: Hash) -> Result<Option<Hash>, RpcError> {
        self.call("get next hash", json!([hash.to_hex()])).await
    }

    async fn get_block(&self, height: u32) -> Result<Option<Block>, RpcError> {
        self.call("get block", json!([height])).await
    }

    async fn get_block_by_hash(&self, hash: Hash) -> Result<Option<Block>, RpcError> {
        self.call("get block by hash", json!([hash.to_hex()])).await
    }

    async fn get_block_view(&self, block: &Block) -> Result<CoinView, RpcError> {
        self.call("get block view", json!([block.header.hash.to_hex()]))
            .await
    }

    async fn get_median_time(&self, entry: &ChainEntry) -> Result<u64, RpcError> {
        self.call("get median time", json!([entry.hash.to_hex()]))
            .await
    }

    async fn get_name_state(&self, name_hash: Hash) -> Result<Option<NameState>, RpcError> {
        self.call("get name state", json!([name_hash.to_hex()]))
            .await
    }

    async fn get_tx_meta(&self, txid: Hash) -> Result<Option<TxMeta>, RpcError> {
        self.call("get tx meta", json!([txid.to_hex()])).await
    }

    async fn get_meta_view(&self, meta: &TxMeta) -> Result<CoinView, RpcError> {
        self.call("get tx view", json!([meta.tx.hash.to_hex()]))
            .await
    }

    async fn get_node_info(&self) -> Result<NodeInfo, RpcError> {
        self.call("get info", json!([])).await
    }

    async fn get_mempool_info(&self) -> Result<MempoolInfo, RpcError> {
        self.call("get mempool info", json!([])).await
    }

    async fn get_mempool_txids(&self) -> Result<Vec<Hash>, RpcError> {
        self.call("get mempool", json!([])).await
    }

    async fn get_mempool_by_address(&self, address_hash: &str) -> Result<Vec<Hash>, RpcError> {
        self.call("get mempool by address", json!([address_hash]))
            .await
    }

    async fn get_peers(&self) -> Result<Vec<PeerInfo>, RpcError> {
        self.call("get peers", json!([])).await
    }

    async fn get_peers_location(&self) -> Result<Vec<GeoIp>, RpcError> {
        self.call("get peers location", json!([])).await
    }

    fn subscribe(&self) -> broadcast::Receiver<ChainEvent> {
        self.events.subscribe()
    }
}
