use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("repair request failed: {0}")]
    Llm(#[from] aq_llm::Error),
}
