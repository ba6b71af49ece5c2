//! Shared HTTP plumbing for the Google Cloud REST clients.

use reqwest::{Client, Response};
use thiserror::Error;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Errors raised by the REST clients.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ApiError {
    /// Raised when the request could not be sent or the response not read.
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Request URL.
        url: String,
        /// Message returned by the HTTP client.
        message: String,
    },
    /// Raised when the service answers with a non-success status.
    #[error("{url} returned status {status}: {body}")]
    Status {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body, usually a JSON error document.
        body: String,
    },
    /// Raised when a success response body is not the expected JSON.
    #[error("unexpected response from {url}: {message}")]
    Body {
        /// Request URL.
        url: String,
        /// Decoder message.
        message: String,
    },
}

impl ApiError {
    pub(crate) fn transport(url: &str, err: &reqwest::Error) -> Self {
        Self::Transport {
            url: url.to_owned(),
            message: err.to_string(),
        }
    }
}

/// Builds the HTTP client shared by a REST client instance.
pub(crate) fn http_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Joins an API endpoint and a path without doubling slashes.
pub(crate) fn join_url(endpoint: &str, path: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Passes successful responses through and converts the rest into
/// [`ApiError::Status`].
pub(crate) async fn ensure_success(url: &str, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|err| format!("<unreadable body: {err}>"));
    Err(ApiError::Status {
        url: url.to_owned(),
        status: status.as_u16(),
        body,
    })
}
