use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------
// Page-level analysis
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Auth,
    Registration,
    Search,
    Listing,
    Detail,
    Form,
    Dashboard,
    Checkout,
    Landing,
    Error,
    Other,
}

impl Default for PageType {
    fn default() -> Self {
        PageType::Other
    }
}

/// A single semantically-understood element on a page.
///
/// Invariant: `primary_selector` is non-empty and `confidence` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticElement {
    pub id: String,
    pub element_type: String,
    pub purpose: String,
    pub label: String,
    pub primary_selector: String,
    pub alternative_selectors: Vec<String>,
    pub confidence: f64,
    pub attributes: HashMap<String, String>,
}

impl SemanticElement {
    /// Validate the element invariant: non-empty primary selector, confidence
    /// in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.primary_selector.trim().is_empty() {
            return Err(Error::Invalid {
                field: "primary_selector",
                reason: format!("element {} has an empty primary selector", self.id),
            });
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(Error::Invalid {
                field: "confidence",
                reason: format!("element {} confidence {} out of [0,1]", self.id, self.confidence),
            });
        }
        Ok(())
    }

    pub fn is_input(&self) -> bool {
        matches!(self.element_type.as_str(), "input" | "select" | "textarea" | "checkbox" | "radio")
    }

    pub fn is_link(&self) -> bool {
        matches!(self.element_type.as_str(), "link" | "a" | "nav-link")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionPoint {
    pub selector: String,
    pub action: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataInput {
    pub selector: String,
    pub label: String,
    pub input_kind: String,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationElement {
    pub selector: String,
    pub destination_hint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessibilityIssue {
    pub rule: String,
    pub severity: String,
    pub selector: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub url: String,
    pub title: String,
    pub page_type: PageType,
    pub purpose: String,
    pub elements: Vec<SemanticElement>,
    pub interactions: Vec<InteractionPoint>,
    pub data_inputs: Vec<DataInput>,
    pub navigation: Vec<NavigationElement>,
    pub accessibility_issues: Option<Vec<AccessibilityIssue>>,
    pub dom_fingerprint: String,
    pub load_latency: Duration,
    pub analyzed_at: DateTime<Utc>,
}

impl PageAnalysis {
    pub fn has_forms(&self) -> bool {
        !self.data_inputs.is_empty()
    }

    pub fn has_auth_indicators(&self) -> bool {
        self.page_type == PageType::Auth
            || self
                .elements
                .iter()
                .any(|e| e.purpose.to_ascii_lowercase().contains("login") || e.purpose.to_ascii_lowercase().contains("password"))
    }
}

// ---------------------------------------------------------------------
// Detected business flows
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    Authentication,
    Registration,
    Search,
    Purchase,
    Onboarding,
    ContentCreation,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedFlow {
    pub name: String,
    pub purpose: String,
    pub flow_type: FlowType,
    pub priority: Priority,
    pub confidence: f64,
    pub steps: Vec<String>,
}

// ---------------------------------------------------------------------
// Shared crawl context
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlContext {
    pub base_url: String,
    pub visited_pages: Vec<String>,
    pub detected_patterns: HashSet<String>,
    pub detected_language: Option<String>,
    pub detected_framework: Option<String>,
    pub domain_hints: Vec<String>,
}

impl CrawlContext {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Default::default() }
    }
}

// ---------------------------------------------------------------------
// AppModel: result of discovery
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlStats {
    pub pages_discovered: usize,
    pub pages_analyzed: usize,
    pub total_elements: usize,
    pub accessibility_score: f64,
    pub agent_timeline: Vec<AgentTimelineEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTimelineEntry {
    pub agent: String,
    pub url: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration: Duration,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainAnalysis {
    pub domain: String,
    pub user_roles: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessRequirement {
    pub id: String,
    pub description: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStory {
    pub role: String,
    pub goal: String,
    pub benefit: String,
    pub given: String,
    pub when: String,
    pub then: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub overall: RiskLevel,
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessAnalysis {
    pub domain_analysis: DomainAnalysis,
    pub requirements: Vec<BusinessRequirement>,
    pub user_stories: Vec<UserStory>,
    pub risk: RiskAssessment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppModel {
    pub base_url: String,
    pub pages: HashMap<String, PageAnalysis>,
    pub flows: Vec<DetectedFlow>,
    pub stats: CrawlStats,
    pub crawl_duration: Duration,
    pub warnings: Vec<String>,
    pub business_analysis: Option<BusinessAnalysis>,
}

impl AppModel {
    /// Accessibility score: `clamp(100 - 10 * issues_per_page, 0, 100)`.
    pub fn compute_accessibility_score(&self) -> f64 {
        if self.pages.is_empty() {
            return 100.0;
        }
        let total_issues: usize = self
            .pages
            .values()
            .filter_map(|p| p.accessibility_issues.as_ref())
            .map(|v| v.len())
            .sum();
        let issues_per_page = total_issues as f64 / self.pages.len() as f64;
        (100.0 - 10.0 * issues_per_page).clamp(0.0, 100.0)
    }
}

// ---------------------------------------------------------------------
// Test suite data model
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    Smoke,
    Regression,
    E2e,
    Negative,
    Boundary,
    Security,
    Accessibility,
    Performance,
}

impl Default for TestType {
    fn default() -> Self {
        TestType::Regression
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Navigate,
    Click,
    Fill,
    Select,
    Check,
    Wait,
    Assert,
    Screenshot,
    Hover,
    Scroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionType {
    Visible,
    Hidden,
    TextEquals,
    TextContains,
    UrlContains,
    AttributeEquals,
    Count,
    Enabled,
    Checked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assertion {
    pub assertion_type: AssertionType,
    pub target: String,
    pub value: Option<String>,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub order: u32,
    pub action: StepAction,
    pub target: String,
    pub selector_candidates: Vec<String>,
    pub value: Option<String>,
    pub assertions: Vec<Assertion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TestFlags {
    pub parallelizable: bool,
    pub idempotent: bool,
    pub destructive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub name: String,
    pub test_type: TestType,
    pub priority: Priority,
    pub category: String,
    pub given: String,
    pub when: String,
    pub then: String,
    pub target_url: String,
    pub steps: Vec<Step>,
    pub required_role: Option<String>,
    pub data_variants: Vec<serde_json::Value>,
    pub depends_on: Vec<String>,
    pub flags: TestFlags,
    pub retry_policy: RetryPolicy,
    pub estimated_duration: Duration,
}

impl TestCase {
    /// True for tests whose BDD triple + step count makes them "trivial"
    /// enough that the validator does not require at least one assertion.
    pub fn is_trivial(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub description: String,
    pub scenarios: Vec<Scenario>,
}

impl Feature {
    pub fn test_case_count(&self) -> usize {
        self.scenarios.iter().map(|s| s.test_cases.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenshotPolicy {
    Never,
    OnFailure,
    Always,
}

impl Default for ScreenshotPolicy {
    fn default() -> Self {
        ScreenshotPolicy::OnFailure
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280, height: 720 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub base_url: String,
    pub default_timeout: Duration,
    pub retry_policy: RetryPolicy,
    pub viewport: Viewport,
    pub screenshot_policy: ScreenshotPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuite {
    pub name: String,
    pub project_id: String,
    pub config: SuiteConfig,
    pub features: Vec<Feature>,
    pub warnings: Vec<String>,
}

impl TestSuite {
    pub fn all_test_cases(&self) -> impl Iterator<Item = &TestCase> {
        self.features.iter().flat_map(|f| f.scenarios.iter()).flat_map(|s| s.test_cases.iter())
    }

    pub fn total_test_cases(&self) -> usize {
        self.all_test_cases().count()
    }

    /// Checks the two cross-cutting suite invariants: unique ids and
    /// contiguous 1-based step ordering.
    pub fn validate_invariants(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for tc in self.all_test_cases() {
            if !seen.insert(tc.id.clone()) {
                return Err(Error::DuplicateTestId(tc.id.clone()));
            }
            let mut expected = 1u32;
            for step in &tc.steps {
                if step.order != expected {
                    return Err(Error::NonContiguousStepOrder { test_id: tc.id.clone() });
                }
                expected += 1;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStandard {
    Wcag,
    Soc2,
    Gdpr,
    Custom,
}

/// Aggregated statistics over a synthesized `TestSuite`: totals sliced by
/// type/priority/category/role, a coverage score, and a compliance score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteStats {
    pub total: usize,
    pub by_type: HashMap<TestType, usize>,
    pub by_priority: HashMap<Priority, usize>,
    pub by_category: HashMap<String, usize>,
    pub by_role: HashMap<String, usize>,
    pub coverage_score: f64,
    pub compliance_score: f64,
    pub compliance_standards_covered: Vec<ComplianceStandard>,
}

// ---------------------------------------------------------------------
// Project: output of the script generator
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub file_count: usize,
    pub page_object_count: usize,
    pub test_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    pub files: HashMap<String, String>,
    pub summary: ProjectSummary,
}

// ---------------------------------------------------------------------
// Self-healing
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    IdChanged,
    ClassChanged,
    StructureChanged,
    TextChanged,
    ElementRemoved,
    ElementMoved,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealingRequest {
    pub failing_selector: String,
    pub error_message: String,
    pub dom_snippet: String,
    pub test_code: Option<String>,
    pub failure_line: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealingResult {
    pub repaired_selector: String,
    pub alternative_selectors: Vec<String>,
    pub explanation: String,
    pub confidence: f64,
    pub change_type: ChangeType,
    pub root_cause: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_case(id: &str, orders: &[u32]) -> TestCase {
        TestCase {
            id: id.to_string(),
            name: "sample".into(),
            test_type: TestType::Regression,
            priority: Priority::Medium,
            category: "functional".into(),
            given: "a".into(),
            when: "b".into(),
            then: "c".into(),
            target_url: "/".into(),
            steps: orders
                .iter()
                .map(|&o| Step {
                    order: o,
                    action: StepAction::Click,
                    target: "button".into(),
                    selector_candidates: vec!["#id".into()],
                    value: None,
                    assertions: vec![],
                })
                .collect(),
            required_role: None,
            data_variants: vec![],
            depends_on: vec![],
            flags: TestFlags::default(),
            retry_policy: RetryPolicy::default(),
            estimated_duration: Duration::from_secs(1),
        }
    }

    fn suite_with(cases: Vec<TestCase>) -> TestSuite {
        TestSuite {
            name: "suite".into(),
            project_id: "p1".into(),
            config: SuiteConfig {
                base_url: "https://example.com".into(),
                default_timeout: Duration::from_secs(30),
                retry_policy: RetryPolicy::default(),
                viewport: Viewport::default(),
                screenshot_policy: ScreenshotPolicy::default(),
            },
            features: vec![Feature {
                name: "f".into(),
                description: String::new(),
                scenarios: vec![Scenario { name: "s".into(), test_cases: cases }],
            }],
            warnings: vec![],
        }
    }

    #[test]
    fn unique_ids_and_contiguous_steps_pass() {
        let suite = suite_with(vec![sample_case("t1", &[1, 2, 3]), sample_case("t2", &[1])]);
        assert!(suite.validate_invariants().is_ok());
        assert_eq!(suite.total_test_cases(), 2);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let suite = suite_with(vec![sample_case("t1", &[1]), sample_case("t1", &[1])]);
        assert!(matches!(suite.validate_invariants(), Err(Error::DuplicateTestId(_))));
    }

    #[test]
    fn non_contiguous_steps_are_rejected() {
        let suite = suite_with(vec![sample_case("t1", &[1, 3])]);
        assert!(matches!(suite.validate_invariants(), Err(Error::NonContiguousStepOrder { .. })));
    }

    #[test]
    fn accessibility_score_clamps_to_zero_with_many_issues() {
        let mut pages = HashMap::new();
        for i in 0..2 {
            pages.insert(
                format!("page{i}"),
                PageAnalysis {
                    url: format!("https://x/{i}"),
                    title: String::new(),
                    page_type: PageType::Other,
                    purpose: String::new(),
                    elements: vec![],
                    interactions: vec![],
                    data_inputs: vec![],
                    navigation: vec![],
                    accessibility_issues: Some(
                        (0..20)
                            .map(|_| AccessibilityIssue {
                                rule: "r".into(),
                                severity: "high".into(),
                                selector: "x".into(),
                                message: "m".into(),
                            })
                            .collect(),
                    ),
                    dom_fingerprint: "f".into(),
                    load_latency: Duration::from_millis(1),
                    analyzed_at: Utc::now(),
                },
            );
        }
        let model = AppModel {
            base_url: "https://x".into(),
            pages,
            flows: vec![],
            stats: CrawlStats::default(),
            crawl_duration: Duration::from_secs(1),
            warnings: vec![],
            business_analysis: None,
        };
        assert_eq!(model.compute_accessibility_score(), 0.0);
    }

    #[test]
    fn accessibility_score_defaults_to_100_with_no_pages() {
        let model = AppModel {
            base_url: "https://x".into(),
            pages: HashMap::new(),
            flows: vec![],
            stats: CrawlStats::default(),
            crawl_duration: Duration::from_secs(0),
            warnings: vec![],
            business_analysis: None,
        };
        assert_eq!(model.compute_accessibility_score(), 100.0);
    }

    #[test]
    fn element_validate_rejects_empty_selector() {
        let el = SemanticElement {
            id: "e1".into(),
            element_type: "button".into(),
            purpose: "submit".into(),
            label: "Submit".into(),
            primary_selector: "".into(),
            alternative_selectors: vec![],
            confidence: 0.9,
            attributes: HashMap::new(),
        };
        assert!(el.validate().is_err());
    }
}
