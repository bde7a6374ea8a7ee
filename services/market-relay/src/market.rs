//! Candle and ticker aggregation over subgraph period data
//!
//! The subgraph returns periods newest-first with numeric fields encoded as
//! decimal strings. Everything here reshapes that into chart-ready numbers;
//! nothing is cached between requests.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::fmt::Display;
use std::str::FromStr;
use types::ids::PoolAddress;
use types::market::{change_percent, Candle, CandleSeries, Interval, Ticker};

use crate::subgraph::{SubgraphClient, SubgraphError};

pub const DEFAULT_LIMIT: u32 = 200;
pub const MAX_LIMIT: u32 = 500;
/// Upper bound on daily periods served when hourly data is missing.
pub const MAX_FALLBACK_DAYS: u32 = 365;

const HOUR_CANDLES_QUERY: &str = r#"
    query($pool: String!, $first: Int!) {
        poolHourDatas(first: $first, orderBy: periodStartUnix, orderDirection: desc, where: { pool: $pool }) {
            periodStartUnix
            open
            high
            low
            close
            volumeToken0
            volumeToken1
        }
    }
"#;

const DAY_CANDLES_QUERY: &str = r#"
    query($pool: String!, $first: Int!) {
        poolDayDatas(first: $first, orderBy: date, orderDirection: desc, where: { pool: $pool }) {
            date
            open
            high
            low
            close
            volumeUSD
        }
    }
"#;

const TICKER_QUERY: &str = r#"
    query($pool: String!) {
        pool(id: $pool) {
            id
            token0 { symbol decimals }
            token1 { symbol decimals }
            feeTier
            liquidity
            sqrtPrice
            tick
            volumeUSD
            totalValueLockedUSD
        }
        poolDayDatas(first: 2, orderBy: date, orderDirection: desc, where: { pool: $pool }) {
            date
            volumeUSD
            high
            low
            open
            close
        }
    }
"#;

/// Subgraph numbers: BigDecimal/BigInt fields arrive as strings, Int fields
/// as JSON numbers. Accept either.
mod lenient {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr<T> {
        Value(T),
        Text(String),
    }

    fn resolve<T, E>(repr: Repr<T>) -> Result<T, E>
    where
        T: FromStr,
        T::Err: Display,
        E: serde::de::Error,
    {
        match repr {
            Repr::Value(v) => Ok(v),
            Repr::Text(s) => s.trim().parse().map_err(E::custom),
        }
    }

    pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + FromStr,
        T::Err: Display,
    {
        resolve(Repr::<T>::deserialize(deserializer)?)
    }

    pub fn opt_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + FromStr,
        T::Err: Display,
    {
        Option::<Repr<T>>::deserialize(deserializer)?
            .map(resolve::<T, D::Error>)
            .transpose()
    }
}

/// One `poolHourDatas` row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourRow {
    #[serde(deserialize_with = "lenient::number")]
    pub period_start_unix: i64,
    #[serde(deserialize_with = "lenient::number")]
    pub open: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub high: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub low: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub close: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub volume_token0: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub volume_token1: f64,
}

impl From<HourRow> for Candle {
    fn from(row: HourRow) -> Self {
        Candle {
            timestamp: row.period_start_unix * 1000,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume_token0 + row.volume_token1,
        }
    }
}

/// One `poolDayDatas` row.
#[derive(Debug, Clone, Deserialize)]
pub struct DayRow {
    #[serde(deserialize_with = "lenient::number")]
    pub date: i64,
    #[serde(deserialize_with = "lenient::number")]
    pub open: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub high: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub low: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub close: f64,
    #[serde(rename = "volumeUSD", deserialize_with = "lenient::number")]
    pub volume_usd: f64,
}

impl From<DayRow> for Candle {
    fn from(row: DayRow) -> Self {
        Candle {
            timestamp: row.date * 1000,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume_usd,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenMeta {
    pub symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolMeta {
    pub id: String,
    pub token0: Option<TokenMeta>,
    pub token1: Option<TokenMeta>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub fee_tier: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TickerResponse {
    pub pool: Option<PoolMeta>,
    #[serde(rename = "poolDayDatas")]
    pub days: Option<Vec<DayRow>>,
}

/// Parse the `limit` query value: default when absent or unparsable,
/// otherwise clamped into `1..=MAX_LIMIT`.
pub fn clamp_limit(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .map(|n| n.clamp(1, MAX_LIMIT as i64) as u32)
        .unwrap_or(DEFAULT_LIMIT)
}

/// Newest-first rows → at most `limit` candles, oldest first.
fn to_series<R: Into<Candle>>(rows: Vec<R>, limit: u32) -> Vec<Candle> {
    let mut candles: Vec<Candle> = rows
        .into_iter()
        .take(limit as usize)
        .map(Into::into)
        .collect();
    candles.reverse();
    candles
}

/// Query one interval's period rows and reshape them into candles.
async fn fetch_series<R>(
    client: &SubgraphClient,
    pool: &PoolAddress,
    interval: Interval,
    limit: u32,
) -> Result<Vec<Candle>, SubgraphError>
where
    R: DeserializeOwned + Into<Candle>,
{
    let query = match interval {
        Interval::Hour => HOUR_CANDLES_QUERY,
        Interval::Day => DAY_CANDLES_QUERY,
    };
    let mut data = client
        .query(query, json!({ "pool": pool, "first": limit }))
        .await?;

    let rows: Vec<R> = match data.get_mut(interval.entity()).map(Value::take) {
        None | Some(Value::Null) => Vec::new(),
        Some(rows) => serde_json::from_value(rows)?,
    };
    Ok(to_series(rows, limit))
}

async fn fetch_hourly(
    client: &SubgraphClient,
    pool: &PoolAddress,
    limit: u32,
) -> Result<Vec<Candle>, SubgraphError> {
    fetch_series::<HourRow>(client, pool, Interval::Hour, limit).await
}

async fn fetch_daily(
    client: &SubgraphClient,
    pool: &PoolAddress,
    limit: u32,
) -> Result<Vec<Candle>, SubgraphError> {
    fetch_series::<DayRow>(client, pool, Interval::Day, limit).await
}

/// Candles for `pool`, oldest first.
///
/// An empty hourly series is retried once against daily data (capped at
/// [`MAX_FALLBACK_DAYS`]) and reported as `1d`.
pub async fn fetch_candles(
    client: &SubgraphClient,
    pool: &PoolAddress,
    interval: Interval,
    limit: u32,
) -> Result<CandleSeries, SubgraphError> {
    match interval {
        Interval::Day => Ok(CandleSeries {
            interval,
            candles: fetch_daily(client, pool, limit).await?,
        }),
        Interval::Hour => {
            let candles = fetch_hourly(client, pool, limit).await?;
            if !candles.is_empty() {
                return Ok(CandleSeries { interval, candles });
            }

            tracing::debug!(%pool, "no hourly data, falling back to daily candles");
            Ok(CandleSeries {
                interval: Interval::Day,
                candles: fetch_daily(client, pool, limit.min(MAX_FALLBACK_DAYS)).await?,
            })
        }
    }
}

/// Build a ticker from the pool metadata and its newest two daily rows.
pub fn derive_ticker(resp: TickerResponse, now_millis: i64) -> Ticker {
    let days = resp.days.unwrap_or_default();
    let latest = days.first();
    let previous = days.get(1);

    let price = latest.map_or(0.0, |d| d.close);
    let prev_close = previous.map_or(price, |d| d.close);

    let (pool, token0, token1, fee_tier) = match resp.pool {
        Some(meta) => (
            Some(meta.id),
            meta.token0.and_then(|t| t.symbol),
            meta.token1.and_then(|t| t.symbol),
            meta.fee_tier,
        ),
        None => (None, None, None, None),
    };

    Ticker {
        pool,
        token0,
        token1,
        fee_tier,
        price,
        change_percent_24h: change_percent(price, prev_close),
        volume_24h: latest.map_or(0.0, |d| d.volume_usd),
        high_24h: latest.map_or(price, |d| d.high),
        low_24h: latest.map_or(price, |d| d.low),
        timestamp: now_millis,
    }
}

pub async fn fetch_ticker(
    client: &SubgraphClient,
    pool: &PoolAddress,
) -> Result<Ticker, SubgraphError> {
    let resp: TickerResponse = client
        .query_as(TICKER_QUERY, json!({ "pool": pool }))
        .await?;
    Ok(derive_ticker(resp, types::now_millis()))
}
