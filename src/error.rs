//! Error types for the storefront core
//!
//! Each failure domain gets its own enum so callers can match on exactly
//! the failures they can act on. Nothing here is ever allowed to escape
//! uncaught into the rendering layer: gateway and storage errors are
//! converted into visible state by the coordinator and resolver.

use thiserror::Error;

/// Failures of the persistent key-value backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failures talking to the external Order Service.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure (connect, DNS, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success HTTP status.
    #[error("order service returned status {code}")]
    Status { code: u16 },

    /// The service answered 200 but flagged the operation as failed.
    #[error("{message}")]
    Rejected { message: String },

    /// The response body did not have the expected shape.
    #[error("malformed response from order service: {0}")]
    MalformedResponse(String),
}

/// Failures of a checkout attempt, surfaced to the user verbatim.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Local input validation failed; no network call was made.
    #[error("{0}")]
    Validation(String),

    /// Order creation failed after validation passed.
    #[error("{0}")]
    Submission(String),
}
