use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Crawl(#[from] aq_crawler::Error),

    #[error("no pages were crawled")]
    NoPages,
}
