//! Self-healing selector repair: a pure function from a failing selector
//! plus context to a candidate replacement. Persisting accepted repairs is
//! the caller's responsibility; this crate never writes anywhere.

pub mod classify;
pub mod error;
pub mod prompts;

pub use classify::{classify, FailureKind};
pub use error::{Error, Result};

use aq_core::HealingRequest;
pub use aq_core::{ChangeType, HealingResult};
use aq_llm::Gateway;
use serde::Deserialize;

/// Default confidence floor below which a repair must not be applied
/// automatically.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct HealerConfig {
    pub min_confidence: f64,
}

impl Default for HealerConfig {
    fn default() -> Self {
        Self { min_confidence: DEFAULT_MIN_CONFIDENCE }
    }
}

impl HealerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("AQ_HEALER_MIN_CONFIDENCE") {
            if let Ok(value) = raw.parse() {
                config.min_confidence = value;
            }
        }
        config
    }
}

#[derive(Debug, Deserialize)]
struct RewriteOutput {
    rewritten_code: String,
}

pub struct Healer<'a> {
    gateway: &'a Gateway,
    config: HealerConfig,
}

impl<'a> Healer<'a> {
    pub fn new(gateway: &'a Gateway, config: HealerConfig) -> Self {
        Self { gateway, config }
    }

    /// Classifies the failure, asks the gateway for a repaired selector,
    /// and returns the result as-is. Whether the caller trusts it is a
    /// separate decision: use `Self::accepted`.
    #[tracing::instrument(skip(self, request), fields(selector = %request.failing_selector))]
    pub async fn heal(&self, request: &HealingRequest) -> Result<HealingResult> {
        let kind = classify::classify(&request.error_message);
        let system = prompts::repair_system_prompt();
        let user = prompts::repair_user_prompt(request, kind);
        let (result, _usage) = self.gateway.complete_json::<HealingResult>(&system, &user).await?;
        Ok(result)
    }

    /// True if a repair's confidence clears this healer's configured
    /// floor and should be applied without a human in the loop.
    pub fn accepted(&self, result: &HealingResult) -> bool {
        result.confidence >= self.config.min_confidence
    }

    /// Optionally requests a rewritten test-code snippet reflecting an
    /// accepted repair. Only meaningful when the original request carried
    /// `test_code`.
    #[tracing::instrument(skip(self, test_code))]
    pub async fn rewrite_code(&self, test_code: &str, old_selector: &str, new_selector: &str) -> Result<String> {
        let system = prompts::rewrite_system_prompt();
        let user = prompts::rewrite_user_prompt(test_code, old_selector, new_selector);
        let (output, _usage) = self.gateway.complete_json::<RewriteOutput>(&system, &user).await?;
        Ok(output.rewritten_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_respects_configured_confidence_floor() {
        let gateway = Gateway::new(aq_llm::LlmConfig::default(), std::sync::Arc::new(NeverCalled));
        let healer = Healer::new(&gateway, HealerConfig { min_confidence: 0.8 });
        let low = HealingResult {
            repaired_selector: "#x".into(),
            alternative_selectors: vec![],
            explanation: "e".into(),
            confidence: 0.5,
            change_type: ChangeType::Unknown,
            root_cause: "r".into(),
        };
        let high = HealingResult { confidence: 0.9, ..low.clone() };
        assert!(!healer.accepted(&low));
        assert!(healer.accepted(&high));
    }

    struct NeverCalled;

    #[async_trait::async_trait]
    impl aq_llm::Provider for NeverCalled {
        async fn complete(&self, _request: aq_llm::CompletionRequest) -> aq_llm::Result<aq_llm::CompletionResponse> {
            panic!("accepted() must not call the gateway");
        }
    }
}
