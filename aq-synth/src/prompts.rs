use aq_core::{DetectedFlow, PageAnalysis, TestType};

const METHODOLOGY: &str = "\
You design automated browser test cases for a web application. Every test case follows the \
given/when/then BDD structure. Prefer selectors in this priority order when filling \
`selector_candidates`: `data-testid` attributes first, then `data-test`, then a stable `id`, \
then `aria-*` attributes, then `name`, then a single class, and only as a last resort a \
descendant combinator. Never rely on `:nth-child` or other positional selectors. Test \
categories are: smoke (critical happy path), regression (broader functional coverage), e2e \
(cross-page flow), negative (invalid input / error handling), boundary (edge-of-range input), \
security (authorization and injection checks), accessibility (keyboard/ARIA/contrast), and \
performance (latency-sensitive interactions).";

/// Builds the system prompt for one feature-generation call.
pub fn methodology_system_prompt() -> String {
    METHODOLOGY.to_string()
}

/// Test types a page's feature should cover, derived from what was observed
/// on it: forms widen coverage to negative+boundary, auth indicators add
/// security, and accessibility is included whenever the suite is
/// configured to check it.
pub fn required_test_types(page: &PageAnalysis, include_accessibility: bool) -> Vec<TestType> {
    let mut types = vec![TestType::Smoke, TestType::Regression];
    if page.has_forms() {
        types.push(TestType::Negative);
        types.push(TestType::Boundary);
    }
    if page.has_auth_indicators() {
        types.push(TestType::Security);
    }
    if include_accessibility {
        types.push(TestType::Accessibility);
    }
    types
}

/// User prompt for a single page's feature: enumerates what was observed
/// and the test types the generated feature must cover.
pub fn page_user_prompt(page: &PageAnalysis, types: &[TestType]) -> String {
    let mut lines = vec![
        format!("Page: {} ({:?})", page.url, page.page_type),
        format!("Purpose: {}", page.purpose),
    ];

    if !page.interactions.is_empty() {
        lines.push("Interactive elements:".to_string());
        for i in &page.interactions {
            lines.push(format!("- {} [{}]: {}", i.selector, i.action, i.description));
        }
    }
    if !page.data_inputs.is_empty() {
        lines.push("Form fields:".to_string());
        for f in &page.data_inputs {
            lines.push(format!("- {} ({}{}): {}", f.selector, f.input_kind, if f.required { ", required" } else { "" }, f.label));
        }
    }
    if !page.navigation.is_empty() {
        lines.push("Navigation links:".to_string());
        for n in &page.navigation {
            lines.push(format!("- {} -> {}", n.selector, n.destination_hint));
        }
    }

    lines.push(format!("Required test types: {}", types.iter().map(|t| format!("{t:?}")).collect::<Vec<_>>().join(", ")));
    lines.push("Return a JSON object: { \"name\": str, \"description\": str, \"scenarios\": [ { \"name\": str, \"test_cases\": [TestCase] } ] }.".to_string());
    lines.join("\n")
}

/// User prompt for an end-to-end feature covering one detected flow.
pub fn flow_user_prompt(flow: &DetectedFlow) -> String {
    let mut lines = vec![
        format!("Flow: {} ({:?}, priority {:?})", flow.name, flow.flow_type, flow.priority),
        format!("Purpose: {}", flow.purpose),
        "Steps observed across pages:".to_string(),
    ];
    for (i, step) in flow.steps.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, step));
    }
    lines.push("Generate one e2e test case spanning this whole flow end to end.".to_string());
    lines.push("Return a JSON object: { \"name\": str, \"description\": str, \"scenarios\": [ { \"name\": str, \"test_cases\": [TestCase] } ] }.".to_string());
    lines.join("\n")
}
