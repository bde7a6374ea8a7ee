use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use types::errors::ValidationError;

use crate::subgraph::SubgraphError;

/// Central error type for the HTTP surface
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid pool address")]
    InvalidPool(#[from] ValidationError),

    /// Query string that does not fit the expected parameters, such as a
    /// repeated key.
    #[error(transparent)]
    BadQuery(#[from] QueryRejection),

    #[error(transparent)]
    Upstream(#[from] SubgraphError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidPool(_) | AppError::BadQuery(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(e) => {
                tracing::error!(error = %e, "subgraph request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
