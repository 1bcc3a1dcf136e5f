//! Orchestration: runs a crawl, fans discovery agents out over every page,
//! runs the cross-page business-analysis phase, and aggregates everything
//! into an `AppModel`.

pub mod business;
pub mod discovery;
pub mod error;

pub use error::{Error, Result};

use std::sync::Arc;
use std::time::Instant;

use aq_core::{AppModel, CrawlContext, CrawlStats};
use aq_crypto::Cipher;
use aq_llm::Gateway;
use tokio::sync::Mutex;

pub struct OrchestratorConfig {
    pub crawl: aq_crawler::CrawlConfig,
    pub run_business_analysis: bool,
}

pub struct Orchestrator {
    gateway: Arc<Gateway>,
    cipher: Cipher,
}

impl Orchestrator {
    pub fn new(gateway: Arc<Gateway>, cipher: Cipher) -> Self {
        Self { gateway, cipher }
    }

    /// Runs the full discovery pipeline: crawl, per-page agent fan-out,
    /// business analysis, and aggregation.
    #[tracing::instrument(skip(self, config), fields(start_url = %config.crawl.start_url))]
    pub async fn run(&self, config: OrchestratorConfig) -> Result<AppModel> {
        let started = Instant::now();
        let crawled_pages = aq_crawler::crawl(config.crawl.clone(), &self.cipher).await?;

        let context = Mutex::new(CrawlContext::new(config.crawl.start_url.clone()));
        let mut page_analyses = Vec::with_capacity(crawled_pages.len());
        let mut timeline = Vec::new();
        let mut warnings = Vec::new();

        for page in &crawled_pages {
            let context_snapshot = context.lock().await.clone();
            let outcome = discovery::analyze_page(&self.gateway, page, &context_snapshot).await;

            {
                let mut guard = context.lock().await;
                guard.visited_pages.push(page.url.clone());
                if outcome.analysis.has_auth_indicators() {
                    guard.detected_patterns.insert("authentication".to_string());
                }
                if outcome.analysis.has_forms() {
                    guard.detected_patterns.insert("forms".to_string());
                }
            }

            timeline.extend(outcome.timeline);
            warnings.extend(outcome.warnings);
            page_analyses.push(outcome.analysis);
        }

        let final_context = context.into_inner();

        let (flows, business_analysis) = if config.run_business_analysis {
            let outcome = business::run(&self.gateway, &page_analyses, &final_context).await;
            warnings.extend(outcome.warnings);
            (outcome.flows, outcome.business_analysis)
        } else {
            (aq_crawler::heuristic_flows(&page_analyses), None)
        };

        let pages_discovered = crawled_pages.len();
        let total_elements: usize = page_analyses.iter().map(|p| p.elements.len()).sum();
        let pages: std::collections::HashMap<String, aq_core::PageAnalysis> = page_analyses.into_iter().map(|p| (p.url.clone(), p)).collect();

        let mut model = AppModel {
            base_url: final_context.base_url.clone(),
            pages,
            flows,
            stats: CrawlStats { pages_discovered, pages_analyzed: pages_discovered, total_elements, accessibility_score: 0.0, agent_timeline: timeline },
            crawl_duration: started.elapsed(),
            warnings,
            business_analysis,
        };
        model.stats.accessibility_score = model.compute_accessibility_score();

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orchestrator_config_carries_crawl_start_url() {
        let config = OrchestratorConfig { crawl: aq_crawler::CrawlConfig::new("https://example.com"), run_business_analysis: true };
        assert_eq!(config.crawl.start_url, "https://example.com");
    }
}
