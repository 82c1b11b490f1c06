use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Error body returned by the token endpoint, e.g.
/// `{"error": "invalid_grant", "error_description": "expired access/refresh token"}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OAuthFailureResponse {
    /// OAuth error code.
    pub error: String,
    /// Human readable description.
    #[serde(default)]
    pub error_description: Option<String>,
}

impl OAuthFailureResponse {
    /// The grant is no longer valid; the user has to log in again.
    pub fn is_invalid_grant(&self) -> bool {
        self.error == "invalid_grant"
    }

    /// The refresh token was revoked or expired.
    pub fn is_refresh_token_expired(&self) -> bool {
        self.is_invalid_grant()
            && self
                .error_description
                .as_deref()
                .is_some_and(|d| d.contains("expired"))
    }
}

impl fmt::Display for OAuthFailureResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(description) => write!(f, "{}: {}", self.error, description),
            None => f.write_str(&self.error),
        }
    }
}

/// Errors from calls to the token and revoke endpoints.
#[derive(Debug, thiserror::Error)]
pub enum TokenEndpointError {
    #[error(transparent)]
    #[allow(missing_docs)]
    Api(#[from] reqwest::Error),

    #[error(transparent)]
    #[allow(missing_docs)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[allow(missing_docs)]
    InvalidUrl(#[from] url::ParseError),

    /// The server rejected the request with an OAuth error body.
    #[error("OAuth error [{status}]: {response}")]
    Response {
        #[allow(missing_docs)]
        status: StatusCode,
        #[allow(missing_docs)]
        response: OAuthFailureResponse,
    },

    /// The server failed without an OAuth error body.
    #[error("Unexpected response from server: [{status}] {message}")]
    UnexpectedResponse {
        #[allow(missing_docs)]
        status: StatusCode,
        #[allow(missing_docs)]
        message: String,
    },
}
