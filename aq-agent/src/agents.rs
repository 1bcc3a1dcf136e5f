use aq_llm::Gateway;

use crate::error::{Error, Result};
use crate::input::AgentInput;
use crate::meta_prompt::MetaPromptBuilder;
use crate::outputs::{
    AuthenticationOutput, AutonomousBusinessAnalystOutput, BusinessFlowOutput, ElementDiscoveryOutput, FormAnalysisOutput, PageUnderstandingOutput,
};

const PAGE_UNDERSTANDING_SCHEMA: &str = r#"Classify the page and describe its purpose. Respond with JSON matching:
{"page_type": "auth|registration|search|listing|detail|form|dashboard|checkout|landing|error|other", "purpose": "one sentence"}"#;

const ELEMENT_DISCOVERY_SCHEMA: &str = r#"List every semantically meaningful interactive element. For each, provide at least one
selector strategy in `primary_selector` and, where possible, alternatives in `alternative_selectors`. Respond with JSON matching:
{"elements": [{"id": "string", "element_type": "button|input|link|dropdown|...", "purpose": "string", "label": "string",
"primary_selector": "string", "alternative_selectors": ["string"], "confidence": 0.0, "attributes": {}}]}"#;

const AUTHENTICATION_SCHEMA: &str = r#"Determine whether this page exposes an authentication mechanism. Respond with JSON matching:
{"has_auth": true, "mechanism": "form|sso|oauth|null", "kind": "login|logout|mfa|null"}"#;

const FORM_ANALYSIS_SCHEMA: &str = r#"Describe the purpose of any form on the page and its fields. Respond with JSON matching:
{"purpose": "string", "fields": [{"selector": "string", "label": "string", "input_kind": "text|email|password|select|checkbox|...", "required": true}]}"#;

const BUSINESS_FLOW_SCHEMA: &str = r#"Identify multi-page business journeys implied by the pages summarized below. Respond with JSON matching:
{"flows": [{"name": "string", "purpose": "string", "flow_type": "authentication|registration|search|purchase|onboarding|content_creation|other",
"priority": "low|medium|high|critical", "confidence": 0.0, "steps": ["string"]}]}"#;

const ABA_SCHEMA: &str = r#"Act as an autonomous business analyst over the whole application summarized below. Respond with JSON matching:
{"domain_analysis": {"domain": "string", "user_roles": ["string"], "summary": "string"},
"requirements": [{"id": "string", "description": "string", "priority": "low|medium|high|critical"}],
"user_stories": [{"role": "string", "goal": "string", "benefit": "string", "given": "string", "when": "string", "then": "string"}],
"risk": {"overall": "low|medium|high", "factors": ["string"]}}"#;

macro_rules! single_page_agent {
    ($name:ident, $schema:expr, $out:ty) => {
        #[derive(Debug, Default)]
        pub struct $name;

        impl $name {
            pub const NAME: &'static str = stringify!($name);

            #[tracing::instrument(skip(self, gateway, input), fields(url = %input.url))]
            pub async fn analyze(&self, gateway: &Gateway, input: &AgentInput<'_>) -> Result<$out> {
                let system = MetaPromptBuilder::new(input.context).build($schema);
                let (output, _usage) = gateway
                    .complete_json::<$out>(&system, &input.user_prompt())
                    .await
                    .map_err(|source| Error::Llm { agent: Self::NAME, source })?;
                Ok(output)
            }
        }
    };
}

single_page_agent!(PageUnderstandingAgent, PAGE_UNDERSTANDING_SCHEMA, PageUnderstandingOutput);
single_page_agent!(ElementDiscoveryAgent, ELEMENT_DISCOVERY_SCHEMA, ElementDiscoveryOutput);
single_page_agent!(AuthenticationAgent, AUTHENTICATION_SCHEMA, AuthenticationOutput);
single_page_agent!(FormAnalysisAgent, FORM_ANALYSIS_SCHEMA, FormAnalysisOutput);

/// Shared context for the two agents that reason across multiple pages at
/// once instead of a single `AgentInput`.
pub struct PagesSummary<'a> {
    pub base_url: String,
    pub page_summaries: Vec<String>,
    pub context: &'a aq_core::CrawlContext,
}

impl<'a> PagesSummary<'a> {
    pub fn user_prompt(&self) -> String {
        let mut out = format!("Base URL: {}\n\nPages:\n", self.base_url);
        for (i, summary) in self.page_summaries.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, summary));
        }
        out
    }
}

#[derive(Debug, Default)]
pub struct BusinessFlowAgent;

impl BusinessFlowAgent {
    pub const NAME: &'static str = "BusinessFlowAgent";

    #[tracing::instrument(skip(self, gateway, summary))]
    pub async fn analyze(&self, gateway: &Gateway, summary: &PagesSummary<'_>) -> Result<BusinessFlowOutput> {
        let system = MetaPromptBuilder::new(summary.context).build(BUSINESS_FLOW_SCHEMA);
        let (output, _usage) =
            gateway.complete_json::<BusinessFlowOutput>(&system, &summary.user_prompt()).await.map_err(|source| Error::Llm { agent: Self::NAME, source })?;
        Ok(output)
    }
}

#[derive(Debug, Default)]
pub struct AutonomousBusinessAnalystAgent;

impl AutonomousBusinessAnalystAgent {
    pub const NAME: &'static str = "AutonomousBusinessAnalystAgent";

    #[tracing::instrument(skip(self, gateway, summary))]
    pub async fn analyze(&self, gateway: &Gateway, summary: &PagesSummary<'_>) -> Result<AutonomousBusinessAnalystOutput> {
        let system = MetaPromptBuilder::new(summary.context).build(ABA_SCHEMA);
        let (output, _usage) = gateway
            .complete_json::<AutonomousBusinessAnalystOutput>(&system, &summary.user_prompt())
            .await
            .map_err(|source| Error::Llm { agent: Self::NAME, source })?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aq_core::CrawlContext;

    #[test]
    fn pages_summary_prompt_enumerates_pages() {
        let ctx = CrawlContext::new("https://x");
        let summary = PagesSummary { base_url: "https://x".to_string(), page_summaries: vec!["home".to_string(), "login".to_string()], context: &ctx };
        let prompt = summary.user_prompt();
        assert!(prompt.contains("1. home"));
        assert!(prompt.contains("2. login"));
    }

    #[test]
    fn agent_names_are_distinct() {
        let names = [
            PageUnderstandingAgent::NAME,
            ElementDiscoveryAgent::NAME,
            AuthenticationAgent::NAME,
            FormAnalysisAgent::NAME,
            BusinessFlowAgent::NAME,
            AutonomousBusinessAnalystAgent::NAME,
        ];
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }
}
