#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use market_relay::config::RelayConfig;
use market_relay::rpc::{PoolStateReader, RpcError};
use market_relay::shutdown::{self, Shutdown, ShutdownTrigger};
use market_relay::state::AppState;
use market_relay::subgraph::SubgraphClient;
use num_bigint::BigUint;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use types::ids::PoolAddress;
use types::pool::Slot0;

pub const POOL: &str = "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640";
pub const POOL_CHECKSUMMED: &str = "0x88e6A0c2dDD26FEEb64F039a2c41296FcB3f5640";

type Responder = dyn Fn(&Value) -> (StatusCode, String) + Send + Sync;

#[derive(Clone)]
struct Upstream {
    requests: Arc<Mutex<Vec<Value>>>,
    respond: Arc<Responder>,
}

/// In-process stand-in for an HTTP JSON upstream (subgraph or RPC node).
pub struct FakeUpstream {
    pub url: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeUpstream {
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record(State(upstream): State<Upstream>, Json(body): Json<Value>) -> impl IntoResponse {
    let (status, reply) = (upstream.respond)(&body);
    upstream.requests.lock().unwrap().push(body);
    (status, [(header::CONTENT_TYPE, "application/json")], reply)
}

pub async fn spawn_upstream<F>(respond: F) -> FakeUpstream
where
    F: Fn(&Value) -> (StatusCode, String) + Send + Sync + 'static,
{
    let requests = Arc::new(Mutex::new(Vec::new()));
    let upstream = Upstream {
        requests: Arc::clone(&requests),
        respond: Arc::new(respond),
    };
    let app = Router::new().route("/", post(record)).with_state(upstream);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeUpstream {
        url: format!("http://{addr}/"),
        requests,
    }
}

/// Text of the GraphQL query in a recorded subgraph request.
pub fn query_text(request: &Value) -> &str {
    request["query"].as_str().unwrap_or_default()
}

/// Reader that always answers with the same slot0 and counts calls.
#[derive(Default)]
pub struct StaticReader {
    pub calls: AtomicUsize,
}

impl StaticReader {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoolStateReader for StaticReader {
    async fn slot0(&self, _pool: &PoolAddress) -> Result<Slot0, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Slot0 {
            sqrt_price_x96: BigUint::from(1u8) << 96,
            tick: -5,
        })
    }
}

pub fn relay_state(
    subgraph_url: &str,
    reader: Arc<dyn PoolStateReader>,
    tick_interval: Duration,
) -> (AppState, ShutdownTrigger, Shutdown) {
    let (trigger, shutdown) = shutdown::channel();
    let config = RelayConfig {
        subgraph_url: subgraph_url.to_string(),
        tick_interval,
        ..RelayConfig::default()
    };
    let subgraph = SubgraphClient::new(reqwest::Client::new(), subgraph_url);
    let state = AppState::new(config, subgraph, reader, shutdown.clone());
    (state, trigger, shutdown)
}
