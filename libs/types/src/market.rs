//! Market data shapes served to the chart front end
//!
//! Candles and tickers are derived per request from subgraph aggregates and
//! never stored. All prices are plain `f64`: the front end consumes them as
//! JSON numbers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Candle bucket size. The subgraph only aggregates hourly and daily.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Interval {
    #[default]
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "1d")]
    Day,
}

impl Interval {
    /// Resolve a query-string value. Case-insensitive; anything other than
    /// `1d` (including a missing value) resolves to `1h`.
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("1d") => Interval::Day,
            _ => Interval::Hour,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Hour => "1h",
            Interval::Day => "1d",
        }
    }

    /// Subgraph entity holding aggregates for this interval.
    pub fn entity(&self) -> &'static str {
        match self {
            Interval::Hour => "poolHourDatas",
            Interval::Day => "poolDayDatas",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single OHLCV candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Period start, Unix milliseconds
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// `GET /candles` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    /// Interval actually served; differs from the requested one when the
    /// hourly series was empty and daily data was used instead.
    pub interval: Interval,
    /// Ascending by `timestamp`.
    pub candles: Vec<Candle>,
}

/// 24h summary for one pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    /// `None` when the subgraph does not index the pool
    pub pool: Option<String>,
    pub token0: Option<String>,
    pub token1: Option<String>,
    pub fee_tier: Option<u32>,
    pub price: f64,
    pub change_percent_24h: f64,
    pub volume_24h: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    /// Unix milliseconds at which the ticker was computed
    pub timestamp: i64,
}

/// Percent change from `prev` to `price`; 0 when there is no usable base.
pub fn change_percent(price: f64, prev: f64) -> f64 {
    if prev == 0.0 || prev.is_nan() {
        0.0
    } else {
        (price - prev) / prev * 100.0
    }
}
