use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SmmTurkApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    /// The request never produced an HTTP response (DNS, connect, timeout, connection reset).
    #[error("Could not reach the provider: {message}")]
    Transport { message: String, connect: bool, timeout: bool },
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    /// The provider answered with `{"error": "..."}`. The message is passed through verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("Unexpected response from provider: {0}")]
    InvalidResponse(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
}

impl SmmTurkApiError {
    /// Transient failures are worth retrying. Application-level rejections and malformed responses are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::QueryError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// True if the request provably never reached the provider.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, Self::Transport { connect: true, .. })
    }
}

impl From<reqwest::Error> for SmmTurkApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport { message: e.to_string(), connect: e.is_connect(), timeout: e.is_timeout() }
    }
}
