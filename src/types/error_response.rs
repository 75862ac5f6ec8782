use serde::{Deserialize, Serialize};

/// The error object inside an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Numeric status echoed by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,

    /// Human-readable error message.
    pub message: String,

    /// Symbolic status such as `INVALID_ARGUMENT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Body of a non-success response from the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The error details.
    pub error: ErrorObject,
}

impl ErrorResponse {
    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.error.message
    }
}
