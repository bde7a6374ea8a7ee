//! Pool state reads over Ethereum JSON-RPC
//!
//! Only `slot0()` is needed, so instead of a full contract binding the call
//! is a raw `eth_call` with the function selector and the two leading return
//! words are decoded by hand.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use types::errors::ValidationError;
use types::ids::PoolAddress;
use types::pool::Slot0;

/// `bytes4(keccak256("slot0()"))`
pub const SLOT0_SELECTOR: &str = "0x3850c7bd";

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("RPC request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("RPC endpoint returned HTTP {0}")]
    Status(u16),

    #[error("RPC error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("RPC response carried neither result nor error")]
    MissingResult,

    #[error(transparent)]
    Decode(#[from] ValidationError),
}

/// Source of live pool state. The broadcaster only depends on this seam so it
/// can be driven without a node.
#[async_trait]
pub trait PoolStateReader: Send + Sync {
    async fn slot0(&self, pool: &PoolAddress) -> Result<Slot0, RpcError>;
}

#[derive(Debug, Deserialize)]
struct NodeError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<NodeError>,
}

/// JSON-RPC 2.0 client for a single endpoint.
#[derive(Clone)]
pub struct RpcClient {
    http: Client,
    url: Arc<str>,
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    pub fn new(http: Client, url: impl Into<Arc<str>>) -> Self {
        Self {
            http,
            url: url.into(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// `eth_call` against the latest block, returning the raw hex result.
    pub async fn eth_call(&self, to: &PoolAddress, data: &str) -> Result<String, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "eth_call",
            "params": [{ "to": to, "data": data }, "latest"],
        });

        let res = self.http.post(&*self.url).json(&body).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(RpcError::Status(status.as_u16()));
        }

        let resp: RpcResponse = res.json().await?;
        if let Some(err) = resp.error {
            return Err(RpcError::Node {
                code: err.code,
                message: err.message,
            });
        }
        resp.result.ok_or(RpcError::MissingResult)
    }
}

#[async_trait]
impl PoolStateReader for RpcClient {
    async fn slot0(&self, pool: &PoolAddress) -> Result<Slot0, RpcError> {
        let raw = self.eth_call(pool, SLOT0_SELECTOR).await?;
        Ok(Slot0::from_abi_hex(&raw)?)
    }
}
