//! HTTP completion backend for the configured upstream providers.
//!
//! grok, openai, deepseek and poe speak the OpenAI chat-completions format;
//! claude speaks the Anthropic messages format. API keys are read from the
//! environment once, at construction.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use aigate_core::error::BackendError;
use aigate_core::model::ModelId;

use super::{CompletionBackend, CompletionRequest};
use crate::config::{ApiStyle, ProviderConfig};

const BASE_SYSTEM_PROMPT: &str = "You are an AI assistant for the NXD Web3 domain platform. \
You're knowledgeable about domains, blockchain, staking, governance, and Web3 technologies. \
Be helpful, concise, and friendly.";

const ANTHROPIC_VERSION: &str = "2023-06-01";

// Keys shipped in sample env files; treated as absent.
const PLACEHOLDER_KEYS: [&str; 2] = ["sk-placeholder", "test-key"];

struct Provider {
    cfg: ProviderConfig,
    api_key: Option<String>,
}

pub struct HttpCompletionBackend {
    client: reqwest::Client,
    providers: HashMap<ModelId, Provider>,
    timeout_ms: u64,
}

impl HttpCompletionBackend {
    /// `timeout` is the transport-level bound; the gateway applies its own on top.
    pub fn new(
        providers: &HashMap<ModelId, ProviderConfig>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Http(format!("client build failed: {e}")))?;

        let providers = providers
            .iter()
            .map(|(model, cfg)| {
                let api_key = std::env::var(&cfg.api_key_env)
                    .ok()
                    .filter(|k| !k.is_empty() && !PLACEHOLDER_KEYS.contains(&k.as_str()));
                if api_key.is_none() {
                    tracing::warn!(%model, env = %cfg.api_key_env, "provider api key not set; calls will fail");
                }
                (*model, Provider { cfg: cfg.clone(), api_key })
            })
            .collect();

        Ok(Self {
            client,
            providers,
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    /// Models with a usable API key.
    pub fn configured_models(&self) -> Vec<ModelId> {
        let mut out: Vec<ModelId> = self
            .providers
            .iter()
            .filter(|(_, p)| p.api_key.is_some())
            .map(|(m, _)| *m)
            .collect();
        out.sort();
        out
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionBackend {
    async fn complete(&self, req: CompletionRequest<'_>) -> Result<String, BackendError> {
        let provider = self
            .providers
            .get(&req.model)
            .ok_or_else(|| BackendError::NotConfigured(req.model.to_string()))?;
        let key = provider
            .api_key
            .as_deref()
            .ok_or_else(|| BackendError::NotConfigured(provider.cfg.api_key_env.clone()))?;

        let system = system_prompt(req.message_type, req.context);
        let cfg = &provider.cfg;
        let builder = self.client.post(&cfg.endpoint);
        let builder = match cfg.style {
            ApiStyle::OpenAi => builder.bearer_auth(key).json(&json!({
                "model": cfg.model,
                "max_tokens": cfg.max_tokens,
                "temperature": 0.7,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": req.prompt },
                ]
            })),
            ApiStyle::Anthropic => builder
                .header("x-api-key", key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&json!({
                    "model": cfg.model,
                    "max_tokens": cfg.max_tokens,
                    "system": system,
                    "messages": [
                        { "role": "user", "content": req.prompt },
                    ]
                })),
        };

        tracing::debug!(model = %req.model, endpoint = %cfg.endpoint, "sending completion request");

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout(self.timeout_ms)
            } else {
                BackendError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api(format!("HTTP {status}: {body}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(format!("invalid json body: {e}")))?;

        extract_text(cfg.style, &body)
    }
}

/// System prompt for a message-type hint, with optional caller context.
pub fn system_prompt(message_type: Option<&str>, context: Option<&str>) -> String {
    let mut s = BASE_SYSTEM_PROMPT.to_string();
    let focus = match message_type {
        Some("domain_search") => " Focus on helping with domain search, availability, and suggestions.",
        Some("market_analysis") => {
            " Provide insights about domain market trends, pricing, and investment opportunities."
        }
        Some("staking_guide") => {
            " Help with NXD token staking, rewards calculation, and optimization strategies."
        }
        Some("governance_help") => {
            " Assist with DAO governance, proposal creation, voting, and platform governance."
        }
        _ => "",
    };
    s.push_str(focus);
    if let Some(ctx) = context.filter(|c| !c.trim().is_empty()) {
        s.push_str("\n\nContext: ");
        s.push_str(ctx);
    }
    s
}

fn extract_text(style: ApiStyle, body: &Value) -> Result<String, BackendError> {
    let text = match style {
        ApiStyle::OpenAi => body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str),
        ApiStyle::Anthropic => body
            .get("content")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("text"))
            .and_then(Value::as_str),
    };
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t.to_string()),
        Some(_) => Err(BackendError::Parse("empty completion".into())),
        None => Err(BackendError::Parse(format!("unexpected response format: {body}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_adds_focus_and_context() {
        let s = system_prompt(Some("governance_help"), Some("proposal #12"));
        assert!(s.starts_with(BASE_SYSTEM_PROMPT));
        assert!(s.contains("DAO governance"));
        assert!(s.ends_with("Context: proposal #12"));

        assert_eq!(system_prompt(Some("unknown"), Some("  ")), BASE_SYSTEM_PROMPT);
    }

    #[test]
    fn extracts_openai_and_anthropic_shapes() {
        let openai = json!({"choices": [{"message": {"role": "assistant", "content": "hi"}}]});
        assert_eq!(extract_text(ApiStyle::OpenAi, &openai), Ok("hi".to_string()));

        let anthropic = json!({"content": [{"type": "text", "text": "hello"}]});
        assert_eq!(extract_text(ApiStyle::Anthropic, &anthropic), Ok("hello".to_string()));

        assert!(matches!(
            extract_text(ApiStyle::Anthropic, &openai),
            Err(BackendError::Parse(_))
        ));
        let blank = json!({"choices": [{"message": {"content": "  "}}]});
        assert!(extract_text(ApiStyle::OpenAi, &blank).is_err());
    }

    #[tokio::test]
    async fn unconfigured_model_fails_without_network() {
        let backend = HttpCompletionBackend::new(&HashMap::new(), Duration::from_secs(1))
            .unwrap_or_else(|e| panic!("{e}"));
        let err = backend
            .complete(CompletionRequest {
                model: ModelId::Grok,
                prompt: "hi",
                context: None,
                message_type: None,
            })
            .await
            .expect_err("must fail");
        assert_eq!(err, BackendError::NotConfigured("grok".into()));
        assert!(backend.configured_models().is_empty());
    }
}
