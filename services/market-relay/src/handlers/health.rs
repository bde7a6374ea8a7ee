use crate::state::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "subscriptions": state.subscriptions.subscribed_count(),
    }))
}
