use aq_core::{BusinessRequirement, DetectedFlow, DomainAnalysis, PageType, RiskAssessment, SemanticElement, UserStory};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PageUnderstandingOutput {
    pub page_type: PageType,
    pub purpose: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementDiscoveryOutput {
    pub elements: Vec<SemanticElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticationOutput {
    pub has_auth: bool,
    pub mechanism: Option<String>,
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormField {
    pub selector: String,
    pub label: String,
    pub input_kind: String,
    pub required: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormAnalysisOutput {
    pub purpose: String,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusinessFlowOutput {
    pub flows: Vec<DetectedFlow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutonomousBusinessAnalystOutput {
    pub domain_analysis: DomainAnalysis,
    pub requirements: Vec<BusinessRequirement>,
    pub user_stories: Vec<UserStory>,
    pub risk: RiskAssessment,
}
