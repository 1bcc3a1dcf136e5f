use std::collections::HashMap;

use aq_core::{ComplianceStandard, Priority, SuiteStats, TestSuite, TestType};

/// Aggregates a synthesized suite into totals, per-dimension counts, a
/// coverage score (are the "must-have" test types present), and a
/// compliance score (are the standards-relevant test types present).
pub fn calculate_stats(suite: &TestSuite) -> SuiteStats {
    let mut by_type: HashMap<TestType, usize> = HashMap::new();
    let mut by_priority: HashMap<Priority, usize> = HashMap::new();
    let mut by_category: HashMap<String, usize> = HashMap::new();
    let mut by_role: HashMap<String, usize> = HashMap::new();
    let mut total = 0usize;

    for tc in suite.all_test_cases() {
        total += 1;
        *by_type.entry(tc.test_type).or_insert(0) += 1;
        *by_priority.entry(tc.priority).or_insert(0) += 1;
        *by_category.entry(tc.category.clone()).or_insert(0) += 1;
        if let Some(role) = &tc.required_role {
            *by_role.entry(role.clone()).or_insert(0) += 1;
        }
    }

    let coverage_score = coverage_score(&by_type);
    let compliance_standards_covered = covered_standards(&by_type, &by_category);
    let compliance_score = compliance_standards_covered.len() as f64 / 4.0 * 100.0;

    SuiteStats { total, by_type, by_priority, by_category, by_role, coverage_score, compliance_score, compliance_standards_covered }
}

fn coverage_score(by_type: &HashMap<TestType, usize>) -> f64 {
    let mut score = 0.0;
    for must_have in [TestType::Smoke, TestType::Regression] {
        if by_type.contains_key(&must_have) {
            score += 20.0;
        }
    }
    for should_have in [TestType::Negative, TestType::Security, TestType::Accessibility, TestType::E2e] {
        if by_type.contains_key(&should_have) {
            score += 15.0;
        }
    }
    score.min(100.0)
}

fn covered_standards(by_type: &HashMap<TestType, usize>, by_category: &HashMap<String, usize>) -> Vec<ComplianceStandard> {
    let mut standards = Vec::new();
    if by_type.contains_key(&TestType::Accessibility) {
        standards.push(ComplianceStandard::Wcag);
    }
    if by_type.contains_key(&TestType::Security) {
        standards.push(ComplianceStandard::Soc2);
    }
    if by_category.keys().any(|c| {
        let lower = c.to_ascii_lowercase();
        lower.contains("privacy") || lower.contains("gdpr") || lower.contains("data-retention")
    }) {
        standards.push(ComplianceStandard::Gdpr);
    }
    let known = ["functional", "negative", "boundary", "security", "accessibility", "performance"];
    if by_category.keys().any(|c| !known.contains(&c.as_str())) {
        standards.push(ComplianceStandard::Custom);
    }
    standards
}

#[cfg(test)]
mod tests {
    use super::*;
    use aq_core::*;
    use std::time::Duration;

    fn case(test_type: TestType, category: &str) -> TestCase {
        TestCase {
            id: format!("{test_type:?}-{category}"),
            name: "n".into(),
            test_type,
            priority: Priority::Medium,
            category: category.into(),
            given: "a".into(),
            when: "b".into(),
            then: "c".into(),
            target_url: "/".into(),
            steps: vec![],
            required_role: None,
            data_variants: vec![],
            depends_on: vec![],
            flags: TestFlags::default(),
            retry_policy: RetryPolicy::default(),
            estimated_duration: Duration::from_secs(1),
        }
    }

    fn suite(cases: Vec<TestCase>) -> TestSuite {
        TestSuite {
            name: "s".into(),
            project_id: "p".into(),
            config: SuiteConfig {
                base_url: "https://x".into(),
                default_timeout: Duration::from_secs(30),
                retry_policy: RetryPolicy::default(),
                viewport: Viewport::default(),
                screenshot_policy: ScreenshotPolicy::default(),
            },
            features: vec![Feature { name: "f".into(), description: String::new(), scenarios: vec![Scenario { name: "s".into(), test_cases: cases }] }],
            warnings: vec![],
        }
    }

    #[test]
    fn coverage_score_rewards_smoke_and_regression() {
        let stats = calculate_stats(&suite(vec![case(TestType::Smoke, "functional"), case(TestType::Regression, "functional")]));
        assert_eq!(stats.coverage_score, 40.0);
        assert_eq!(stats.total, 2);
    }

    #[test]
    fn compliance_score_counts_accessibility_and_security() {
        let stats = calculate_stats(&suite(vec![case(TestType::Accessibility, "accessibility"), case(TestType::Security, "security")]));
        assert_eq!(stats.compliance_score, 50.0);
        assert!(stats.compliance_standards_covered.contains(&ComplianceStandard::Wcag));
        assert!(stats.compliance_standards_covered.contains(&ComplianceStandard::Soc2));
    }

    #[test]
    fn custom_category_is_detected() {
        let stats = calculate_stats(&suite(vec![case(TestType::Regression, "billing-reconciliation")]));
        assert!(stats.compliance_standards_covered.contains(&ComplianceStandard::Custom));
    }
}
