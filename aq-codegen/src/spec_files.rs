use std::collections::HashMap;

use aq_core::{Assertion, AssertionType, Step, StepAction, TestCase, TestSuite, TestType};

use crate::strings::{escape, snake_case};

const TYPE_ORDER: [TestType; 8] = [
    TestType::Smoke,
    TestType::Regression,
    TestType::E2e,
    TestType::Negative,
    TestType::Boundary,
    TestType::Security,
    TestType::Accessibility,
    TestType::Performance,
];

/// Renders one spec file per test type, each grouping its tests by feature
/// then scenario. Within a file, a test function name colliding with one
/// already emitted is suffixed with a counter so the file still compiles.
pub fn render_spec_files(suite: &TestSuite) -> Vec<(String, String)> {
    let mut by_type: HashMap<TestType, Vec<(&str, &str, &TestCase)>> = HashMap::new();

    for feature in &suite.features {
        for scenario in &feature.scenarios {
            for tc in &scenario.test_cases {
                by_type.entry(tc.test_type).or_default().push((feature.name.as_str(), scenario.name.as_str(), tc));
            }
        }
    }

    TYPE_ORDER.into_iter().filter_map(|t| by_type.remove(&t).map(|cases| render_type_file(t, &cases))).collect()
}

fn render_type_file(test_type: TestType, cases: &[(&str, &str, &TestCase)]) -> (String, String) {
    let dir = type_dir(test_type);
    let mut content = format!("//! Generated {dir} specs.\n\nuse super::support::TestDriver;\n\n");

    let mut used_names: HashMap<String, u32> = HashMap::new();
    let mut current_feature = None;
    let mut current_scenario = None;

    for (feature_name, scenario_name, tc) in cases {
        if current_feature != Some(*feature_name) {
            content.push_str(&format!("\n// Feature: {feature_name}\n"));
            current_feature = Some(*feature_name);
            current_scenario = None;
        }
        if current_scenario != Some(*scenario_name) {
            content.push_str(&format!("// Scenario: {scenario_name}\n"));
            current_scenario = Some(*scenario_name);
        }

        let fn_name = unique_fn_name(&mut used_names, &snake_case(&tc.id));
        content.push_str(&render_test_fn(&fn_name, tc));
    }

    (format!("tests/{dir}/mod.rs"), content)
}

fn type_dir(test_type: TestType) -> &'static str {
    match test_type {
        TestType::Smoke => "smoke",
        TestType::Regression => "regression",
        TestType::E2e => "e2e",
        TestType::Negative => "negative",
        TestType::Boundary => "boundary",
        TestType::Security => "security",
        TestType::Accessibility => "accessibility",
        TestType::Performance => "performance",
    }
}

fn unique_fn_name(used: &mut HashMap<String, u32>, base: &str) -> String {
    let base = format!("test_{base}");
    match used.get_mut(&base) {
        None => {
            used.insert(base.clone(), 1);
            base
        }
        Some(count) => {
            *count += 1;
            format!("{base}_{count}")
        }
    }
}

fn render_test_fn(fn_name: &str, tc: &TestCase) -> String {
    let mut out = format!(
        "\n// Given {given}\n// When {when}\n// Then {then}\npub fn {fn_name}(driver: &mut impl TestDriver) -> Result<(), String> {{\n",
        given = tc.given,
        when = tc.when,
        then = tc.then,
    );
    out.push_str(&format!("    driver.navigate(\"{}\")?;\n", escape(&tc.target_url)));

    for step in &tc.steps {
        out.push_str(&render_step(step));
    }

    out.push_str("    Ok(())\n}\n");
    out
}

fn render_step(step: &Step) -> String {
    let selector = step.selector_candidates.first().map(String::as_str).unwrap_or("");
    let value = step.value.as_deref().unwrap_or("");
    let mut out = match step.action {
        StepAction::Navigate => format!("    driver.navigate(\"{}\")?;\n", escape(selector)),
        StepAction::Click => format!("    driver.click(\"{}\")?;\n", escape(selector)),
        StepAction::Fill => format!("    driver.fill(\"{}\", \"{}\")?;\n", escape(selector), escape(value)),
        StepAction::Select => format!("    driver.select(\"{}\", \"{}\")?;\n", escape(selector), escape(value)),
        StepAction::Check => format!("    driver.check(\"{}\")?;\n", escape(selector)),
        StepAction::Wait => format!("    driver.wait(\"{}\")?;\n", escape(selector)),
        StepAction::Assert => String::new(),
        StepAction::Screenshot => format!("    driver.screenshot(\"{}\")?;\n", escape(&step.target)),
        StepAction::Hover => format!("    driver.hover(\"{}\")?;\n", escape(selector)),
        StepAction::Scroll => format!("    driver.scroll(\"{}\")?;\n", escape(selector)),
    };

    for assertion in &step.assertions {
        out.push_str(&render_assertion(assertion));
    }
    out
}

fn render_assertion(assertion: &Assertion) -> String {
    let target = escape(&assertion.target);
    let value = assertion.value.as_deref().map(escape).unwrap_or_default();
    match assertion.assertion_type {
        AssertionType::Visible => format!("    driver.assert_visible(\"{target}\")?;\n"),
        AssertionType::Hidden => format!("    driver.assert_hidden(\"{target}\")?;\n"),
        AssertionType::TextEquals => format!("    driver.assert_text_equals(\"{target}\", \"{value}\")?;\n"),
        AssertionType::TextContains => format!("    driver.assert_text_contains(\"{target}\", \"{value}\")?;\n"),
        AssertionType::UrlContains => format!("    driver.assert_url_contains(\"{value}\")?;\n"),
        AssertionType::AttributeEquals => format!("    driver.assert_attribute_equals(\"{target}\", \"{value}\")?;\n"),
        AssertionType::Count => format!("    driver.assert_count(\"{target}\", \"{value}\")?;\n"),
        AssertionType::Enabled => format!("    driver.assert_enabled(\"{target}\")?;\n"),
        AssertionType::Checked => format!("    driver.assert_checked(\"{target}\")?;\n"),
    }
}
