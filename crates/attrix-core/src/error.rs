use thiserror::Error;

/// Failures scoped to a single work item.
///
/// Every variant is converted into an error payload at the batch loop edge;
/// none of them abort the rest of the batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Upstream returned a non-success HTTP status.
    #[error("API error: upstream returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be interpreted as a report.
    #[error("malformed report body: {0}")]
    Malformed(String),

    /// The work item itself is unusable (bad token or date).
    #[error("invalid work item: {0}")]
    InvalidItem(String),
}

impl ReportError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    pub fn invalid_item(message: impl Into<String>) -> Self {
        Self::InvalidItem(message.into())
    }
}
