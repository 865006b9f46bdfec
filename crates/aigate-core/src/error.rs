//! Shared error type across aigate crates.

use thiserror::Error;

use crate::model::ModelId;
use crate::tier::TierId;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request.
    BadRequest,
    /// Daily prompt quota used up for the caller's tier.
    QuotaExceeded,
    /// Tier has no reachable model (server misconfiguration).
    NoModelAvailable,
    /// Upstream model failed, fallback included.
    UpstreamError,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::QuotaExceeded => "QUOTA_EXCEEDED",
            ClientCode::NoModelAvailable => "NO_MODEL_AVAILABLE",
            ClientCode::UpstreamError => "UPSTREAM_ERROR",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Failure of a single completion backend call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("timed out after {0} ms")]
    Timeout(u64),
    #[error("http: {0}")]
    Http(String),
    #[error("api: {0}")]
    Api(String),
    #[error("unexpected response: {0}")]
    Parse(String),
    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("daily limit reached ({limit}). Upgrade your tier for more AI access.")]
    QuotaExceeded { limit: u32 },
    #[error("no available AI models for tier {tier}")]
    NoModelAvailable { tier: TierId },
    #[error("model {model} failed: {cause}")]
    Upstream { model: ModelId, cause: BackendError },
    #[error("usage store: {0}")]
    Store(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            GatewayError::BadRequest(_) => ClientCode::BadRequest,
            GatewayError::QuotaExceeded { .. } => ClientCode::QuotaExceeded,
            GatewayError::NoModelAvailable { .. } => ClientCode::NoModelAvailable,
            GatewayError::Upstream { .. } => ClientCode::UpstreamError,
            GatewayError::Store(_) | GatewayError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Whether the caller may retry the same request later (with backoff).
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Upstream { .. } | GatewayError::Store(_))
    }
}
