//! Upstream model identifiers and their relative cost weights.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Upstream model family the gateway can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelId {
    Grok,
    OpenAi,
    Claude,
    DeepSeek,
    Poe,
}

impl ModelId {
    pub const ALL: [ModelId; 5] = [
        ModelId::Grok,
        ModelId::OpenAi,
        ModelId::Claude,
        ModelId::DeepSeek,
        ModelId::Poe,
    ];

    /// Wire and config name.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelId::Grok => "grok",
            ModelId::OpenAi => "openai",
            ModelId::Claude => "claude",
            ModelId::DeepSeek => "deepseek",
            ModelId::Poe => "poe",
        }
    }

    /// Relative cost weight. Advisory only: quota counts prompts, not weight.
    pub fn cost_weight(self) -> u32 {
        match self {
            ModelId::Grok | ModelId::DeepSeek => 1,
            ModelId::Poe => 2,
            ModelId::OpenAi => 3,
            ModelId::Claude => 4,
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelId::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| GatewayError::BadRequest(format!("unknown model: {s}")))
    }
}

/// Caller's model preference: a concrete model or `auto` (let policy decide).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PreferredModel {
    #[default]
    Auto,
    Model(ModelId),
}

impl PreferredModel {
    pub fn model(self) -> Option<ModelId> {
        match self {
            PreferredModel::Auto => None,
            PreferredModel::Model(m) => Some(m),
        }
    }
}

impl FromStr for PreferredModel {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(PreferredModel::Auto),
            other => other.parse().map(PreferredModel::Model),
        }
    }
}

impl TryFrom<String> for PreferredModel {
    type Error = GatewayError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PreferredModel> for String {
    fn from(p: PreferredModel) -> Self {
        match p {
            PreferredModel::Auto => "auto".to_string(),
            PreferredModel::Model(m) => m.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names_and_auto() {
        assert_eq!("deepseek".parse::<ModelId>().ok(), Some(ModelId::DeepSeek));
        assert_eq!("auto".parse::<PreferredModel>().ok(), Some(PreferredModel::Auto));
        assert_eq!(
            "openai".parse::<PreferredModel>().ok(),
            Some(PreferredModel::Model(ModelId::OpenAi))
        );
        assert!("gpt-5".parse::<PreferredModel>().is_err());
    }

    #[test]
    fn serde_names_match_display() {
        for m in ModelId::ALL {
            let json = serde_json::to_string(&m).unwrap_or_default();
            assert_eq!(json, format!("\"{m}\""));
        }
    }
}
