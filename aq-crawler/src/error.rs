use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("page extraction failed for {url}: {reason}")]
    Extraction { url: String, reason: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error(transparent)]
    Crypto(#[from] aq_crypto::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}
