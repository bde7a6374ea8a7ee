use crate::config::RelayConfig;
use crate::rpc::{PoolStateReader, RpcClient};
use crate::shutdown::Shutdown;
use crate::subgraph::SubgraphClient;
use crate::subscriptions::SubscriptionRegistry;
use reqwest::Client;
use std::sync::Arc;

/// Server context shared by both listeners and the tick broadcaster.
///
/// Created once at startup; dropping the last clone releases the HTTP client
/// pool.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub subgraph: SubgraphClient,
    pub pool_reader: Arc<dyn PoolStateReader>,
    pub subscriptions: Arc<SubscriptionRegistry>,
    pub shutdown: Shutdown,
}

impl AppState {
    pub fn new(
        config: RelayConfig,
        subgraph: SubgraphClient,
        pool_reader: Arc<dyn PoolStateReader>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            config: Arc::new(config),
            subgraph,
            pool_reader,
            subscriptions: Arc::new(SubscriptionRegistry::new()),
            shutdown,
        }
    }

    /// Wire real upstream clients from configuration. One pooled HTTP client
    /// serves both the subgraph and the RPC node.
    pub fn from_config(config: RelayConfig, shutdown: Shutdown) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        let subgraph = SubgraphClient::new(http.clone(), config.subgraph_url.as_str());
        let rpc = RpcClient::new(http, config.rpc_url.as_str());

        Ok(Self::new(config, subgraph, Arc::new(rpc), shutdown))
    }
}
