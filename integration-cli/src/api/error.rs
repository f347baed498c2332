//! Error types for the integration platform API client

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised by the HTTP layer of the API client
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success status
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: StatusCode,
        body: String,
    },

    /// The request could not be sent or the response could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the expected OData payload
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(err) => err.status(),
            _ => None,
        }
    }
}

/// Returns true when the error chain contains a rate-limit rejection (HTTP 429).
///
/// The status may sit directly on an [`ApiError::Status`], or inside the
/// response carried by a transport error; both are checked anywhere in the chain.
pub fn is_rate_limit_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(api) = cause.downcast_ref::<ApiError>() {
            return api.status() == Some(StatusCode::TOO_MANY_REQUESTS);
        }
        if let Some(http) = cause.downcast_ref::<reqwest::Error>() {
            return http.status() == Some(StatusCode::TOO_MANY_REQUESTS);
        }
        false
    })
}

#[cfg(test)]
pub(crate) fn status_error(status: u16) -> anyhow::Error {
    anyhow::Error::new(ApiError::Status {
        method: "GET".to_string(),
        url: "https://tenant.example/api/v1/test".to_string(),
        status: StatusCode::from_u16(status).expect("valid status"),
        body: String::new(),
    })
}
