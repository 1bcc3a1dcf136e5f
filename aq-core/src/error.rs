use thiserror::Error;

/// Crate-wide result alias, mirroring the convention used by every
/// downstream AutoQA crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or validating the shared data model.
///
/// Variants are grouped by the five error kinds from the platform's error
/// handling design: transient external failures are not representable here
/// (they belong to `aq-llm`/`aq-crawler`); this enum only carries input and
/// validation failures that originate in the data model itself.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("duplicate test id: {0}")]
    DuplicateTestId(String),

    #[error("step order is not contiguous starting at 1 for test {test_id}")]
    NonContiguousStepOrder { test_id: String },

    #[error("cancelled: {0}")]
    Cancelled(String),
}
