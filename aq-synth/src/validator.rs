use aq_core::TestSuite;
use regex::Regex;

/// Step count bounds enforced by `validate`. A test with zero steps is a
/// placeholder (caught separately by `TestCase::is_trivial`); a test with
/// more than `max` steps is almost certainly several tests merged into one.
pub const MIN_STEPS: usize = 1;
pub const MAX_STEPS: usize = 30;

/// Scores how resilient a selector is to DOM churn: 1.0 is a dedicated test
/// hook, 0.1 is a brittle positional selector.
pub fn selector_score(selector: &str) -> f64 {
    let nth = Regex::new(r":nth-").unwrap();
    let base = if selector.contains("data-testid") {
        1.0
    } else if selector.contains("data-test") {
        0.95
    } else if selector.contains("[aria-") {
        0.85
    } else if is_bare_id(selector) {
        0.8
    } else if selector.contains("[name=") {
        0.7
    } else if is_bare_class(selector) {
        0.5
    } else if selector.contains(' ') || selector.contains('>') {
        0.3
    } else {
        0.4
    };

    let mut score = base;
    if nth.is_match(selector) {
        score *= 0.3;
    }
    if selector.len() > 80 {
        score *= 0.7;
    }
    score.clamp(0.05, 1.0)
}

fn is_bare_id(selector: &str) -> bool {
    selector.starts_with('#') && !selector.contains(' ') && !selector.contains('>') && !selector.contains('.')
}

fn is_bare_class(selector: &str) -> bool {
    selector.starts_with('.') && !selector.contains(' ') && !selector.contains('>')
}

/// A non-fatal issue found while walking a generated suite. The caller
/// surfaces these as warnings; none of them abort synthesis.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub test_id: String,
    pub message: String,
}

/// Walks every test case in the suite and reports everything that violates
/// the suite's structural invariants, without mutating anything.
pub fn validate(suite: &TestSuite) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for tc in suite.all_test_cases() {
        if tc.id.trim().is_empty() {
            issues.push(ValidationIssue { test_id: tc.id.clone(), message: "empty id".to_string() });
        }
        if tc.name.trim().is_empty() {
            issues.push(ValidationIssue { test_id: tc.id.clone(), message: "empty name".to_string() });
        }
        if tc.given.trim().is_empty() || tc.when.trim().is_empty() || tc.then.trim().is_empty() {
            issues.push(ValidationIssue { test_id: tc.id.clone(), message: "incomplete BDD triple".to_string() });
        }
        if !tc.is_trivial() && !(MIN_STEPS..=MAX_STEPS).contains(&tc.steps.len()) {
            issues.push(ValidationIssue { test_id: tc.id.clone(), message: format!("step count {} outside [{MIN_STEPS}, {MAX_STEPS}]", tc.steps.len()) });
        }
        if !tc.is_trivial() && tc.steps.iter().all(|s| s.assertions.is_empty()) {
            issues.push(ValidationIssue { test_id: tc.id.clone(), message: "no assertion anywhere in the test".to_string() });
        }
        for step in &tc.steps {
            if step.selector_candidates.is_empty() || step.selector_candidates[0].trim().is_empty() {
                issues.push(ValidationIssue { test_id: tc.id.clone(), message: format!("step {} has no primary selector", step.order) });
            }
        }
    }

    issues
}

/// Repairs what it safely can: fills in missing ids, renumbers step order
/// into a contiguous 1-based sequence, and applies defaults for fields the
/// generator left unset. Returns a warning per repair made.
pub fn validate_and_fix(suite: &mut TestSuite) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut next_id = 1usize;

    for feature in &mut suite.features {
        for scenario in &mut feature.scenarios {
            for tc in &mut scenario.test_cases {
                if tc.id.trim().is_empty() {
                    let generated = format!("tc-{next_id:04}");
                    warnings.push(format!("generated missing id {generated} for test {:?}", tc.name));
                    tc.id = generated;
                }
                next_id += 1;

                if tc.name.trim().is_empty() {
                    tc.name = format!("{} / {}", feature.name, scenario.name);
                }

                for (i, step) in tc.steps.iter_mut().enumerate() {
                    let expected = (i + 1) as u32;
                    if step.order != expected {
                        warnings.push(format!("renumbered step in test {} from {} to {expected}", tc.id, step.order));
                        step.order = expected;
                    }
                }

                if tc.category.trim().is_empty() {
                    tc.category = "functional".to_string();
                }
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_testid_scores_highest() {
        assert_eq!(selector_score("[data-testid='submit']"), 1.0);
    }

    #[test]
    fn nth_child_selector_is_penalized() {
        let plain = selector_score("button");
        let nth = selector_score("li:nth-child(3) button");
        assert!(nth < plain);
    }

    #[test]
    fn descendant_combinator_scores_low() {
        assert_eq!(selector_score("div.card button"), 0.3);
    }

    #[test]
    fn validate_and_fix_fills_missing_ids_and_renumbers_steps() {
        use aq_core::*;
        use std::time::Duration;

        let mut suite = TestSuite {
            name: "s".into(),
            project_id: "p".into(),
            config: SuiteConfig {
                base_url: "https://x".into(),
                default_timeout: Duration::from_secs(30),
                retry_policy: RetryPolicy::default(),
                viewport: Viewport::default(),
                screenshot_policy: ScreenshotPolicy::default(),
            },
            features: vec![Feature {
                name: "login".into(),
                description: String::new(),
                scenarios: vec![Scenario {
                    name: "happy path".into(),
                    test_cases: vec![TestCase {
                        id: String::new(),
                        name: "submits".into(),
                        test_type: TestType::default(),
                        priority: Priority::default(),
                        category: String::new(),
                        given: "a".into(),
                        when: "b".into(),
                        then: "c".into(),
                        target_url: "/login".into(),
                        steps: vec![Step { order: 5, action: StepAction::Click, target: "submit".into(), selector_candidates: vec!["#submit".into()], value: None, assertions: vec![] }],
                        required_role: None,
                        data_variants: vec![],
                        depends_on: vec![],
                        flags: TestFlags::default(),
                        retry_policy: RetryPolicy::default(),
                        estimated_duration: Duration::from_secs(1),
                    }],
                }],
            }],
            warnings: vec![],
        };

        let warnings = validate_and_fix(&mut suite);
        assert!(!warnings.is_empty());
        let tc = &suite.features[0].scenarios[0].test_cases[0];
        assert!(!tc.id.is_empty());
        assert_eq!(tc.steps[0].order, 1);
        assert_eq!(tc.category, "functional");
    }
}
