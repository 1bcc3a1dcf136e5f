use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("feature generation for {target} failed: {source}")]
    Generation { target: String, #[source] source: aq_llm::Error },

    #[error(transparent)]
    Core(#[from] aq_core::Error),
}
