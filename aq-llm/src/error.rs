use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the LLM gateway.
///
/// The three policy-rejection variants (`CircuitOpen`, `TooManyRequests`,
/// `OverBudget`) are matched by name rather than by string so callers can
/// branch on "rejected by policy" vs. a transient failure vs. a bad input,
/// per the platform's shared error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    #[error("circuit breaker is open for model {model}")]
    CircuitOpen { model: String },

    #[error("half-open request quota exceeded for model {model}")]
    TooManyRequests { model: String },

    #[error("daily cost budget exceeded, only cached responses are served")]
    OverBudget,

    #[error("provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to decode provider response: {0}")]
    Decode(String),

    #[error("provider response had no content")]
    EmptyContent,

    #[error("response was not valid JSON after {attempts} attempt(s): {reason}")]
    Json { attempts: u32, reason: String },

    #[error("request was cancelled")]
    Cancelled,
}

impl Error {
    pub fn is_policy_rejection(&self) -> bool {
        matches!(self, Error::CircuitOpen { .. } | Error::TooManyRequests { .. } | Error::OverBudget)
    }
}
