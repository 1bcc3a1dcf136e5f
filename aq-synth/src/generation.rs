use aq_core::{DetectedFlow, Feature, PageAnalysis, PageType, TestType};
use aq_llm::Gateway;

use crate::prompts::{flow_user_prompt, methodology_system_prompt, page_user_prompt, required_test_types};

pub struct GenerationOutcome {
    pub features: Vec<Feature>,
    pub warnings: Vec<String>,
}

/// Generates one feature per page (grouped by page type purely for
/// ordering), one e2e feature per detected flow, and optionally a security
/// feature (pages with forms or auth indicators) and an accessibility
/// feature. Every call is independent and best-effort: a failure is
/// recorded as a warning, not an abort.
#[tracing::instrument(skip(gateway, pages, flows))]
pub async fn generate(gateway: &Gateway, pages: &[PageAnalysis], flows: &[DetectedFlow], include_accessibility: bool) -> GenerationOutcome {
    let mut features = Vec::new();
    let mut warnings = Vec::new();
    let system = methodology_system_prompt();

    for group in crate::grouping::group_by_page_type(pages) {
        for page in group.1 {
            let types = required_test_types(page, include_accessibility);
            let user = page_user_prompt(page, &types);
            match gateway.complete_json::<Feature>(&system, &user).await {
                Ok((feature, _usage)) => features.push(feature),
                Err(e) => warnings.push(format!("feature generation for page {} failed: {e}", page.url)),
            }
        }
    }

    for flow in flows {
        let user = flow_user_prompt(flow);
        match gateway.complete_json::<Feature>(&system, &user).await {
            Ok((feature, _usage)) => features.push(feature),
            Err(e) => warnings.push(format!("feature generation for flow {} failed: {e}", flow.name)),
        }
    }

    if needs_security_feature(pages) {
        let user = security_user_prompt(pages);
        match gateway.complete_json::<Feature>(&system, &user).await {
            Ok((feature, _usage)) => features.push(feature),
            Err(e) => warnings.push(format!("security feature generation failed: {e}")),
        }
    }

    if include_accessibility {
        let user = accessibility_user_prompt(pages);
        match gateway.complete_json::<Feature>(&system, &user).await {
            Ok((feature, _usage)) => features.push(feature),
            Err(e) => warnings.push(format!("accessibility feature generation failed: {e}")),
        }
    }

    GenerationOutcome { features, warnings }
}

fn needs_security_feature(pages: &[PageAnalysis]) -> bool {
    pages.iter().any(|p| p.has_forms() || p.has_auth_indicators() || p.page_type == PageType::Auth)
}

fn security_user_prompt(pages: &[PageAnalysis]) -> String {
    let targets: Vec<&str> = pages.iter().filter(|p| p.has_forms() || p.has_auth_indicators()).map(|p| p.url.as_str()).collect();
    format!(
        "Generate security test cases (type {:?}) covering authorization boundaries and input \
         sanitization for these pages with forms or authentication: {}.\n\
         Return a JSON object: {{ \"name\": str, \"description\": str, \"scenarios\": [ {{ \"name\": str, \"test_cases\": [TestCase] }} ] }}.",
        TestType::Security,
        targets.join(", ")
    )
}

fn accessibility_user_prompt(pages: &[PageAnalysis]) -> String {
    let targets: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    format!(
        "Generate accessibility test cases (type {:?}) covering keyboard navigation, ARIA \
         attributes, and color contrast for these pages: {}.\n\
         Return a JSON object: {{ \"name\": str, \"description\": str, \"scenarios\": [ {{ \"name\": str, \"test_cases\": [TestCase] }} ] }}.",
        TestType::Accessibility,
        targets.join(", ")
    )
}
