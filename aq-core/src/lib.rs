//! Shared data model and error taxonomy for the AutoQA platform.
//!
//! Every other `aq-*` crate depends on this one for its core types; it has
//! no dependency on any of them.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    AccessibilityIssue, AgentTimelineEntry, AppModel, Assertion, AssertionType, BusinessAnalysis,
    BusinessRequirement, ChangeType, ComplianceStandard, CrawlContext, CrawlStats, DataInput,
    DetectedFlow, DomainAnalysis, Feature, FlowType, HealingRequest, HealingResult,
    InteractionPoint, NavigationElement, PageAnalysis, PageType, Priority, Project,
    ProjectSummary, RetryPolicy, RiskAssessment, RiskLevel, Scenario, ScreenshotPolicy,
    SemanticElement, Severity, Step, StepAction, SuiteConfig, SuiteStats, TestCase, TestFlags,
    TestSuite, TestType, UserStory, Viewport,
};
