//! Keyword prompt classifier.
//!
//! Families are checked in a fixed order and the first hit wins, so a prompt
//! mentioning both "vote" and "code" is `Code`.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptCategory {
    Contract,
    Code,
    Analysis,
    Domain,
    Governance,
    Chat,
}

impl PromptCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PromptCategory::Contract => "contract",
            PromptCategory::Code => "code",
            PromptCategory::Analysis => "analysis",
            PromptCategory::Domain => "domain",
            PromptCategory::Governance => "governance",
            PromptCategory::Chat => "chat",
        }
    }
}

impl fmt::Display for PromptCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// "smart contract" is subsumed by "contract"; kept so the family reads as documented.
const KEYWORDS: [(PromptCategory, &[&str]); 5] = [
    (PromptCategory::Contract, &["contract", "smart contract", "solidity"]),
    (PromptCategory::Code, &["code", "function", "api"]),
    (PromptCategory::Analysis, &["analysis", "analyze", "market"]),
    (PromptCategory::Domain, &["domain", "register", "tld"]),
    (PromptCategory::Governance, &["governance", "proposal", "vote"]),
];

/// Classify prompt text (case-insensitive substring match). Never fails.
pub fn classify(prompt: &str) -> PromptCategory {
    let lower = prompt.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(cat, _)| *cat)
        .unwrap_or(PromptCategory::Chat)
}
