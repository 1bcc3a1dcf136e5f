//! Agent runtime: per-page and per-application LLM agents that turn crawled
//! HTML into structured findings, built on top of the LLM gateway's caching,
//! rate limiting, and circuit breaking.

pub mod agents;
pub mod error;
pub mod input;
pub mod meta_prompt;
pub mod outputs;

pub use agents::{
    AuthenticationAgent, AutonomousBusinessAnalystAgent, BusinessFlowAgent, ElementDiscoveryAgent, FormAnalysisAgent, PageUnderstandingAgent, PagesSummary,
};
pub use error::{Error, Result};
pub use input::AgentInput;
pub use meta_prompt::MetaPromptBuilder;
pub use outputs::{
    AuthenticationOutput, AutonomousBusinessAnalystOutput, BusinessFlowOutput, ElementDiscoveryOutput, FormAnalysisOutput, FormField, PageUnderstandingOutput,
};
