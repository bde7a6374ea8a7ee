//! WebSocket message shapes for the live tick stream
//!
//! Flow: subscribe → subscribed → tick, tick, tick…

use serde::{Deserialize, Serialize};

use crate::ids::PoolAddress;

/// Client → server. Only subscriptions exist; anything else fails to parse
/// and is dropped by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Subscribe { pool: PoolAddress },
}

/// Server → client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Acknowledges a subscription, sent once per subscribe message.
    Subscribed { pool: PoolAddress },
    /// Live pool state derived from `slot0()`.
    Tick {
        pool: PoolAddress,
        tick: i32,
        price: f64,
        /// Unix milliseconds
        ts: i64,
    },
}

/// Parse a raw text frame, returning `None` for anything that is not a
/// well-formed subscribe request.
pub fn parse_client_message(text: &str) -> Option<ClientMessage> {
    serde_json::from_str(text).ok()
}
