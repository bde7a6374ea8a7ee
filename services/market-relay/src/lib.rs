//! Market-Data Relay
//!
//! Serves the DEX front end's charting component:
//! - `GET /candles`: OHLCV series from Uniswap V3 subgraph aggregates
//! - `GET /ticker`: 24h summary for one pool
//! - WebSocket (HTTP port + 1): live `slot0()` ticks per subscribed pool
//!
//! # Architecture
//!
//! ```text
//!  HTTP request            timer (2s)
//!       │                      │
//!  ┌────▼─────┐         ┌──────▼──────┐
//!  │ handlers │         │ broadcaster │ ← one slot0() read per pool
//!  └────┬─────┘         └──┬───────┬──┘
//!       │                  │       │
//!  ┌────▼─────┐      ┌─────▼───┐ ┌─▼────────────┐
//!  │ subgraph │      │ rpc     │ │ subscriptions│
//!  └──────────┘      └─────────┘ └──────┬───────┘
//!                                       │
//!                              per-socket outboxes
//! ```

pub mod broadcaster;
pub mod config;
pub mod error;
pub mod handlers;
pub mod market;
pub mod router;
pub mod rpc;
pub mod server;
pub mod shutdown;
pub mod state;
pub mod subgraph;
pub mod subscriptions;
