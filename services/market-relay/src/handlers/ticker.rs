use crate::error::AppError;
use crate::market;
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use types::ids::PoolAddress;
use types::market::Ticker;

#[derive(Debug, Deserialize)]
pub struct TickerParams {
    pub pool: Option<String>,
}

pub async fn get_ticker(
    State(state): State<AppState>,
    query: Result<Query<TickerParams>, QueryRejection>,
) -> Result<Json<Ticker>, AppError> {
    let Query(params) = query?;
    let pool = PoolAddress::parse(params.pool.as_deref().unwrap_or_default())?;
    let ticker = market::fetch_ticker(&state.subgraph, &pool).await?;
    Ok(Json(ticker))
}
