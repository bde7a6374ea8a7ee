//! Error types for relay inputs
//!
//! Comprehensive error taxonomy using thiserror

use thiserror::Error;

/// Client input that failed validation. Never retried by the relay.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid pool address: {value}")]
    InvalidPoolAddress { value: String },

    #[error("Invalid slot0 payload: {reason}")]
    InvalidSlot0 { reason: String },
}
