use aq_agent::{AutonomousBusinessAnalystAgent, BusinessFlowAgent, PagesSummary};
use aq_core::{BusinessAnalysis, CrawlContext, DetectedFlow, PageAnalysis};
use aq_llm::Gateway;

pub struct BusinessOutcome {
    pub flows: Vec<DetectedFlow>,
    pub business_analysis: Option<BusinessAnalysis>,
    pub warnings: Vec<String>,
}

fn page_summary_lines(pages: &[PageAnalysis]) -> Vec<String> {
    pages.iter().map(|p| format!("{} [{:?}]: {} (forms: {}, auth: {})", p.url, p.page_type, p.purpose, p.has_forms(), p.has_auth_indicators())).collect()
}

/// Runs the cross-page business-analysis phase. Both calls are best-effort:
/// a failed `BusinessFlow` call falls back to the page-type heuristic
/// rather than producing an empty flow list; a failed ABA call simply
/// leaves `business_analysis` unset.
#[tracing::instrument(skip(gateway, pages, context))]
pub async fn run(gateway: &Gateway, pages: &[PageAnalysis], context: &CrawlContext) -> BusinessOutcome {
    let mut warnings = Vec::new();
    if pages.is_empty() {
        return BusinessOutcome { flows: Vec::new(), business_analysis: None, warnings };
    }

    let summary = PagesSummary { base_url: context.base_url.clone(), page_summaries: page_summary_lines(pages), context };

    let flows = match BusinessFlowAgent.analyze(gateway, &summary).await {
        Ok(output) => output.flows,
        Err(e) => {
            warnings.push(format!("BusinessFlow agent failed, falling back to heuristics: {e}"));
            aq_crawler::heuristic_flows(pages)
        }
    };

    let business_analysis = match AutonomousBusinessAnalystAgent.analyze(gateway, &summary).await {
        Ok(output) => Some(BusinessAnalysis {
            domain_analysis: output.domain_analysis,
            requirements: output.requirements,
            user_stories: output.user_stories,
            risk: output.risk,
        }),
        Err(e) => {
            warnings.push(format!("AutonomousBusinessAnalyst agent failed: {e}"));
            None
        }
    };

    BusinessOutcome { flows, business_analysis, warnings }
}
