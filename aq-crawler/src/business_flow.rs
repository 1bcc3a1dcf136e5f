use aq_core::{DetectedFlow, FlowType, PageAnalysis, PageType, Priority};

/// Synthesizes flows from observed page types when the BusinessFlow agent
/// call fails. Deliberately conservative: only emits a flow when a page
/// type strongly implies one, so a failed LLM call degrades to a smaller
/// but still useful flow list rather than an empty one.
pub fn heuristic_flows(pages: &[PageAnalysis]) -> Vec<DetectedFlow> {
    let mut flows = Vec::new();

    if pages.iter().any(|p| p.page_type == PageType::Auth) {
        flows.push(DetectedFlow {
            name: "Authentication Flow".to_string(),
            purpose: "User signs in with valid credentials".to_string(),
            flow_type: FlowType::Authentication,
            priority: Priority::Critical,
            confidence: 0.7,
            steps: vec!["Navigate to login page".to_string(), "Submit valid credentials".to_string(), "Land on an authenticated page".to_string()],
        });
    }

    if pages.iter().any(|p| p.page_type == PageType::Registration) {
        flows.push(DetectedFlow {
            name: "Registration Flow".to_string(),
            purpose: "New user creates an account".to_string(),
            flow_type: FlowType::Registration,
            priority: Priority::High,
            confidence: 0.7,
            steps: vec!["Navigate to registration page".to_string(), "Submit account details".to_string(), "Confirm account creation".to_string()],
        });
    }

    if pages.iter().any(|p| p.page_type == PageType::Search) {
        flows.push(DetectedFlow {
            name: "Search Flow".to_string(),
            purpose: "User searches for content and reviews results".to_string(),
            flow_type: FlowType::Search,
            priority: Priority::Medium,
            confidence: 0.7,
            steps: vec!["Navigate to search page".to_string(), "Enter a query".to_string(), "Review the result list".to_string()],
        });
    }

    if pages.iter().any(|p| p.page_type == PageType::Checkout) {
        flows.push(DetectedFlow {
            name: "Purchase Flow".to_string(),
            purpose: "User completes a checkout".to_string(),
            flow_type: FlowType::Purchase,
            priority: Priority::Critical,
            confidence: 0.7,
            steps: vec!["Add item to cart".to_string(), "Navigate to checkout".to_string(), "Submit payment details".to_string(), "Confirm order".to_string()],
        });
    }

    flows
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn page(page_type: PageType) -> PageAnalysis {
        PageAnalysis {
            url: "https://x.com".to_string(),
            title: "t".to_string(),
            page_type,
            purpose: "p".to_string(),
            elements: Vec::new(),
            interactions: Vec::new(),
            data_inputs: Vec::new(),
            navigation: Vec::new(),
            accessibility_issues: None,
            dom_fingerprint: "f".to_string(),
            load_latency: Duration::from_millis(1),
            analyzed_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn emits_authentication_flow_for_auth_page() {
        let flows = heuristic_flows(&[page(PageType::Auth)]);
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].flow_type, FlowType::Authentication);
    }

    #[test]
    fn emits_nothing_for_plain_landing_page() {
        let flows = heuristic_flows(&[page(PageType::Landing)]);
        assert!(flows.is_empty());
    }

    #[test]
    fn emits_multiple_flows_when_multiple_page_types_present() {
        let flows = heuristic_flows(&[page(PageType::Auth), page(PageType::Checkout)]);
        assert_eq!(flows.len(), 2);
    }
}
