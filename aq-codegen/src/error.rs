use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot render a project from a suite with no test cases")]
    EmptySuite,

    #[error(transparent)]
    Core(#[from] aq_core::Error),
}
