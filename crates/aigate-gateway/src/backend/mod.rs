//! Completion backends.
//!
//! The gateway only sees the `CompletionBackend` trait; the HTTP backend
//! talks to the real providers and tests substitute scripted fakes.

pub mod http;

use async_trait::async_trait;

use aigate_core::error::BackendError;
use aigate_core::model::ModelId;

pub use http::HttpCompletionBackend;

/// One completion call against a named model.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: ModelId,
    pub prompt: &'a str,
    pub context: Option<&'a str>,
    pub message_type: Option<&'a str>,
}

/// Text-completion capability, callable per model. May fail or hang; the
/// gateway bounds every call with its own timeout.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, req: CompletionRequest<'_>) -> Result<String, BackendError>;
}
