//! Pure, deterministic rendering of a runnable test project from a
//! validated `TestSuite`: no network access and no LLM calls, only string
//! templating over the suite's data.

pub mod error;
pub mod page_objects;
pub mod spec_files;
pub mod strings;
pub mod support;

pub use error::{Error, Result};

use aq_core::{Project, ProjectSummary, TestSuite};

/// Renders the full project: one page-object file per unique target page,
/// one spec file per test type, and the shared support file every spec
/// imports. The caller is expected to have already run `aq_synth`'s
/// validator so `suite.validate_invariants()` holds.
#[tracing::instrument(skip(suite), fields(suite = %suite.name, test_cases = suite.total_test_cases()))]
pub fn generate(suite: &TestSuite) -> Result<Project> {
    if suite.total_test_cases() == 0 {
        return Err(Error::EmptySuite);
    }
    suite.validate_invariants()?;

    let mut files = std::collections::HashMap::new();

    let pages = page_objects::render_page_objects(suite);
    let page_object_count = pages.len();
    for (path, content) in pages {
        files.insert(path, content);
    }

    for (path, content) in spec_files::render_spec_files(suite) {
        files.insert(path, content);
    }

    let (support_path, support_content) = support::render_support_file();
    files.insert(support_path, support_content);

    let summary = ProjectSummary { file_count: files.len(), page_object_count, test_count: suite.total_test_cases() };

    Ok(Project { files, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aq_core::*;
    use std::time::Duration;

    fn minimal_suite() -> TestSuite {
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
            features: vec![Feature {
                name: "login".into(),
                description: String::new(),
                scenarios: vec![Scenario {
                    name: "happy path".into(),
                    test_cases: vec![TestCase {
                        id: "t1".into(),
                        name: "submits".into(),
                        test_type: TestType::Smoke,
                        priority: Priority::High,
                        category: "functional".into(),
                        given: "a".into(),
                        when: "b".into(),
                        then: "c".into(),
                        target_url: "/login".into(),
                        steps: vec![Step {
                            order: 1,
                            action: StepAction::Click,
                            target: "submit".into(),
                            selector_candidates: vec!["[data-testid='submit']".into()],
                            value: None,
                            assertions: vec![],
                        }],
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
        }
    }

    #[test]
    fn generate_produces_page_objects_specs_and_support_file() {
        let project = generate(&minimal_suite()).unwrap();
        assert!(project.files.contains_key("src/support.rs"));
        assert!(project.files.contains_key("tests/smoke/mod.rs"));
        assert_eq!(project.summary.page_object_count, 1);
        assert_eq!(project.summary.test_count, 1);
    }

    #[test]
    fn empty_suite_is_rejected() {
        let mut suite = minimal_suite();
        suite.features.clear();
        assert!(matches!(generate(&suite), Err(Error::EmptySuite)));
    }
}
