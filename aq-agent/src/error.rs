use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("agent {agent} call failed: {source}")]
    Llm { agent: &'static str, #[source] source: aq_llm::Error },
}
