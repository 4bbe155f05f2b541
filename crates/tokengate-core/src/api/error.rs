use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Credential storage failed: {0}")]
    Storage(#[source] anyhow::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Pull the human-readable messages out of an error body.
    ///
    /// Handles `{"errors": ["..."]}` and
    /// `{"errors": {"full_messages": ["..."]}}`; anything else falls back to
    /// the raw (truncated) body.
    pub fn server_message(body: &str) -> String {
        let strings = |v: &Value| -> Vec<String> {
            v.as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|i| i.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default()
        };

        if let Ok(json) = serde_json::from_str::<Value>(body) {
            let errors = &json["errors"];
            let mut messages = strings(errors);
            if messages.is_empty() {
                messages = strings(&errors["full_messages"]);
            }
            if !messages.is_empty() {
                return messages.join("; ");
            }
        }

        Self::truncate_body(body.trim())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::server_message(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized(message),
            500..=599 => ApiError::ServerError(message),
            code => ApiError::Rejected {
                status: code,
                message,
            },
        }
    }

    /// True when the server turned the request down, as opposed to the
    /// request never getting an answer.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::Rejected { .. })
    }
}
