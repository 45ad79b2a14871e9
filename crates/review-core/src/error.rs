use thiserror::Error;

/// Everything that can go wrong inside a single poll cycle.
///
/// Every variant is recoverable: the poller logs it, relays it to the chat
/// once, and tries again after the retry interval.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    /// The API payload does not have the expected shape.
    #[error("invalid API response: {0}")]
    Schema(String),
    /// A homework record lacks a required field or carries an unknown status.
    #[error("invalid homework record: {0}")]
    Field(String),
    #[error("endpoint {url} is unavailable: {reason}")]
    Transport { url: String, reason: String },
    #[error("endpoint {url} is unavailable, API response code: {status}")]
    StatusCode { url: String, status: u16 },
}

impl ReviewError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    pub fn field(message: impl Into<String>) -> Self {
        Self::Field(message.into())
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::StatusCode { status, .. } => Some(*status),
            _ => None,
        }
    }

}

/// Renders an error together with every cause in its `source()` chain,
/// joined by `": "`.
pub(crate) fn error_chain(error: &dyn std::error::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.ends_with(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}
