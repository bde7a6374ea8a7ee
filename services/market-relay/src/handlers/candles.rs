use crate::error::AppError;
use crate::market;
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use types::ids::PoolAddress;
use types::market::{CandleSeries, Interval};

/// Raw query string. Everything is optional text so that bad values get the
/// relay's own validation instead of an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct CandleParams {
    pub pool: Option<String>,
    pub interval: Option<String>,
    pub limit: Option<String>,
}

pub async fn get_candles(
    State(state): State<AppState>,
    query: Result<Query<CandleParams>, QueryRejection>,
) -> Result<Json<CandleSeries>, AppError> {
    let Query(params) = query?;
    let pool = PoolAddress::parse(params.pool.as_deref().unwrap_or_default())?;
    let interval = Interval::resolve(params.interval.as_deref());
    let limit = market::clamp_limit(params.limit.as_deref());

    let series = market::fetch_candles(&state.subgraph, &pool, interval, limit).await?;
    Ok(Json(series))
}
