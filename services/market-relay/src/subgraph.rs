//! Uniswap V3 subgraph client
//!
//! A thin GraphQL-over-HTTP caller: every call is a fresh POST, with no
//! retries and no caching. Callers poll at their own cadence.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubgraphError {
    #[error("Subgraph error: {status} {body}")]
    Status { status: u16, body: String },

    /// Serialized `errors` array from the GraphQL response.
    #[error("{0}")]
    GraphQl(String),

    #[error("Subgraph response carried no data")]
    MissingData,

    #[error("Subgraph request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected subgraph payload: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    errors: Option<Value>,
}

#[derive(Clone)]
pub struct SubgraphClient {
    http: Client,
    url: Arc<str>,
}

impl SubgraphClient {
    pub fn new(http: Client, url: impl Into<Arc<str>>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// POST `{query, variables}` and return the `data` member.
    ///
    /// A non-2xx status and a body carrying `errors` are both failures, the
    /// latter even when the status is 200.
    pub async fn query(&self, query: &str, variables: Value) -> Result<Value, SubgraphError> {
        let res = self
            .http
            .post(&*self.url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SubgraphError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GraphQlResponse = res.json().await?;
        if let Some(errors) = body.errors {
            return Err(SubgraphError::GraphQl(errors.to_string()));
        }

        body.data.ok_or(SubgraphError::MissingData)
    }

    /// Like [`query`](Self::query), deserializing `data` into `T`.
    pub async fn query_as<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, SubgraphError> {
        let data = self.query(query, variables).await?;
        Ok(serde_json::from_value(data)?)
    }
}
