use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 4001;
pub const DEFAULT_RPC_URL: &str = "https://ethereum.publicnode.com";
pub const PUBLIC_SUBGRAPH_URL: &str = "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v3";

/// Relay configuration derived from environment variables.
///
/// `PORT`, `MAINNET_RPC_URL` and `GRAPH_API_KEY` keep the names the front
/// end deployment already sets.
#[derive(Clone)]
pub struct RelayConfig {
    pub bind: IpAddr,
    /// HTTP port. The WebSocket listener uses `port + 1`.
    pub port: u16,
    pub rpc_url: String,
    pub subgraph_url: String,
    pub tick_interval: Duration,
    /// Applied to every outbound subgraph and RPC call.
    pub upstream_timeout: Duration,
}

/// Gateway URL when an API key is configured, public hosted service otherwise.
pub fn subgraph_url_for(api_key: Option<&str>) -> String {
    match api_key {
        Some(key) => format!(
            "https://gateway.thegraph.com/api/{key}/subgraphs/name/uniswap/uniswap-v3"
        ),
        None => PUBLIC_SUBGRAPH_URL.to_string(),
    }
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source. Unset, blank or unparsable values take
    /// defaults; zero durations are raised to one millisecond.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let opt = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let millis = |name: &str, default: u64| {
            let ms = opt(name).and_then(|s| s.parse().ok()).unwrap_or(default);
            Duration::from_millis(ms.max(1))
        };

        let api_key = opt("GRAPH_API_KEY");
        let subgraph_url =
            opt("SUBGRAPH_URL").unwrap_or_else(|| subgraph_url_for(api_key.as_deref()));

        Self {
            bind: opt("BIND_ADDR")
                .and_then(|s| s.parse().ok())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: opt("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            rpc_url: opt("MAINNET_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            subgraph_url,
            tick_interval: millis("TICK_INTERVAL_MS", 2000),
            upstream_timeout: millis("UPSTREAM_TIMEOUT_MS", 10_000),
        }
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn ws_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port.saturating_add(1))
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            subgraph_url: PUBLIC_SUBGRAPH_URL.to_string(),
            tick_interval: Duration::from_secs(2),
            upstream_timeout: Duration::from_secs(10),
        }
    }
}

/// Hand-written so the gateway URL (which embeds the API key) never reaches
/// the logs.
impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subgraph = if self.subgraph_url.contains("gateway.thegraph.com/api/") {
            "gateway (keyed)"
        } else {
            self.subgraph_url.as_str()
        };
        f.debug_struct("RelayConfig")
            .field("bind", &self.bind)
            .field("port", &self.port)
            .field("rpc_url", &self.rpc_url)
            .field("subgraph_url", &subgraph)
            .field("tick_interval", &self.tick_interval)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subgraph_url_selection() {
        assert_eq!(subgraph_url_for(None), PUBLIC_SUBGRAPH_URL);
        assert_eq!(
            subgraph_url_for(Some("abc123")),
            "https://gateway.thegraph.com/api/abc123/subgraphs/name/uniswap/uniswap-v3"
        );
    }

    #[test]
    fn test_ws_port_follows_http_port() {
        let cfg = RelayConfig {
            port: 5000,
            ..RelayConfig::default()
        };
        assert_eq!(cfg.http_addr().port(), 5000);
        assert_eq!(cfg.ws_addr().port(), 5001);
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }

    #[test]
    fn test_defaults_when_unset() {
        let cfg = RelayConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(cfg.subgraph_url, PUBLIC_SUBGRAPH_URL);
        assert_eq!(cfg.tick_interval, Duration::from_secs(2));
        assert_eq!(cfg.upstream_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_zero_durations_raised() {
        let cfg = RelayConfig::from_lookup(lookup(&[
            ("TICK_INTERVAL_MS", "0"),
            ("UPSTREAM_TIMEOUT_MS", "0"),
        ]));
        assert_eq!(cfg.tick_interval, Duration::from_millis(1));
        assert_eq!(cfg.upstream_timeout, Duration::from_millis(1));
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let cfg = RelayConfig::from_lookup(lookup(&[
            ("PORT", "not-a-port"),
            ("GRAPH_API_KEY", "k"),
            ("SUBGRAPH_URL", " http://127.0.0.1:8000/ "),
            ("UPSTREAM_TIMEOUT_MS", "2500"),
            ("MAINNET_RPC_URL", ""),
        ]));
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.subgraph_url, "http://127.0.0.1:8000/");
        assert_eq!(cfg.upstream_timeout, Duration::from_millis(2500));
        assert_eq!(cfg.rpc_url, DEFAULT_RPC_URL);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let cfg = RelayConfig {
            subgraph_url: subgraph_url_for(Some("secret-key")),
            ..RelayConfig::default()
        };
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("secret-key"));
        assert!(printed.contains("gateway (keyed)"));
    }
}
