//! Types library for the market-data relay
//!
//! This library provides the domain types shared by the relay service and its
//! tests, so that wire formats are defined in exactly one place.
//!
//! # Modules
//! - `ids`: Identifiers (PoolAddress, ConnectionId)
//! - `market`: Candle and ticker shapes, interval resolution
//! - `pool`: `slot0()` decoding and Q64.96 price conversion
//! - `stream`: WebSocket client/server messages
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod market;
pub mod pool;
pub mod stream;
pub mod errors;

/// Current wall-clock time in Unix milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

