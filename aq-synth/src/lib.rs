//! Test-design synthesis: turns a discovery `AppModel` into a validated,
//! scored `TestSuite`.
//!
//! Generation talks to the LLM gateway and is best-effort per page/flow;
//! validation and scoring are pure functions over the resulting suite.

pub mod error;
pub mod generation;
pub mod grouping;
pub mod prompts;
pub mod stats;
pub mod validator;

pub use error::{Error, Result};
pub use stats::calculate_stats;
pub use validator::{selector_score, validate, validate_and_fix, ValidationIssue};

use std::time::Duration;

use aq_core::{AppModel, PageAnalysis, RetryPolicy, ScreenshotPolicy, SuiteConfig, TestSuite, Viewport};
use aq_llm::Gateway;

pub struct SynthesisConfig {
    pub project_id: String,
    pub suite_name: String,
    pub include_accessibility: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self { project_id: "default".to_string(), suite_name: "Generated Suite".to_string(), include_accessibility: true }
    }
}

/// Runs the full synthesis pipeline: generate features for every page group
/// and detected flow, validate the result, repair what can be repaired, and
/// return the suite with its accumulated warnings. The two structural
/// invariants (unique ids, contiguous step order) are guaranteed on return
/// because `validate_and_fix` runs before this returns.
#[tracing::instrument(skip(gateway, model), fields(base_url = %model.base_url, pages = model.pages.len()))]
pub async fn synthesize(gateway: &Gateway, model: &AppModel, config: SynthesisConfig) -> Result<TestSuite> {
    let mut pages: Vec<PageAnalysis> = model.pages.values().cloned().collect();
    pages.sort_by(|a, b| a.url.cmp(&b.url));

    let outcome = generation::generate(gateway, &pages, &model.flows, config.include_accessibility).await;

    let mut suite = TestSuite {
        name: config.suite_name,
        project_id: config.project_id,
        config: SuiteConfig {
            base_url: model.base_url.clone(),
            default_timeout: Duration::from_secs(30),
            retry_policy: RetryPolicy { max_attempts: 2, backoff: Duration::from_secs(1) },
            viewport: Viewport::default(),
            screenshot_policy: ScreenshotPolicy::default(),
        },
        features: outcome.features,
        warnings: outcome.warnings,
    };

    let fix_warnings = validator::validate_and_fix(&mut suite);
    suite.warnings.extend(fix_warnings);

    for issue in validator::validate(&suite) {
        suite.warnings.push(format!("{}: {}", issue.test_id, issue.message));
    }

    suite.validate_invariants()?;
    Ok(suite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aq_core::CrawlStats;
    use std::collections::HashMap;

    #[tokio::test]
    async fn synthesize_returns_empty_suite_with_no_pages() {
        let provider = std::sync::Arc::new(NeverCalled);
        let gateway = Gateway::new(aq_llm::LlmConfig::default(), provider);
        let model = AppModel {
            base_url: "https://example.com".to_string(),
            pages: HashMap::new(),
            flows: vec![],
            stats: CrawlStats::default(),
            crawl_duration: Duration::from_secs(0),
            warnings: vec![],
            business_analysis: None,
        };

        let suite = synthesize(&gateway, &model, SynthesisConfig::default()).await.unwrap();
        assert_eq!(suite.total_test_cases(), 0);
    }

    struct NeverCalled;

    #[async_trait::async_trait]
    impl aq_llm::Provider for NeverCalled {
        async fn complete(&self, _request: aq_llm::CompletionRequest) -> aq_llm::Result<aq_llm::CompletionResponse> {
            panic!("no pages means no generation calls should be made");
        }
    }
}
