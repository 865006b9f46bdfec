//! Inbound gateway request.

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};
use crate::model::PreferredModel;

/// One prompt submitted to the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayRequest {
    pub prompt: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_address: Option<String>,
    /// Hint forwarded to the backend (selects the system prompt flavour).
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub preferred_model: PreferredModel,
}

impl GatewayRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_preferred(mut self, preferred: PreferredModel) -> Self {
        self.preferred_model = preferred;
        self
    }

    /// Reject blank prompts.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(GatewayError::BadRequest("prompt must not be empty".into()));
        }
        Ok(())
    }

    /// Key under which usage is accounted: user id, else wallet address,
    /// else the shared anonymous bucket. Ids and addresses live in separate
    /// namespaces, and no caller input maps onto the anonymous key.
    pub fn usage_key(&self) -> String {
        match (non_empty(&self.user_id), non_empty(&self.user_address)) {
            (Some(id), _) => user_usage_key(id),
            (None, Some(addr)) => address_usage_key(addr),
            (None, None) => ANONYMOUS_USER.to_string(),
        }
    }
}

/// Usage bucket shared by all callers without an identity. Carries no
/// namespace prefix, so it never equals a derived user or address key.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Usage key for a caller identified by user id.
pub fn user_usage_key(user_id: &str) -> String {
    format!("id:{user_id}")
}

/// Usage key for a caller identified only by wallet address.
pub fn address_usage_key(address: &str) -> String {
    format!("addr:{address}")
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}
