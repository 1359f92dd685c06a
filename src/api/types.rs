//! API error taxonomy.

/// Errors produced by [`super::ApiClient`] implementations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-success status. `message` carries the
    /// body's `error` field when the backend supplied one.
    #[error("API response error: status {status}")]
    Response { status: u16, message: Option<String> },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("API request failed: {0}")]
    Transport(String),

    /// A payload could not be encoded or decoded as the expected record.
    #[error("API response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Structured message supplied by the backend, if any.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Response { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of the failed response, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Extract the `error` string from a backend error body.
///
/// Returns `None` for empty, non-JSON, or non-object bodies and for objects
/// whose `error` field is missing or not a string.
#[must_use]
pub fn parse_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_owned)
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
