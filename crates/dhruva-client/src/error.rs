//! Client error types
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("cannot connect to backend at {0}")]
    Connection(String),

    #[error("Request timeout - backend may be starting up")]
    Timeout,

    /// Non-2xx response; `detail` comes from the body when present
    #[error("{detail}")]
    Status { status: u16, detail: String },

    #[error("malformed backend response: {0}")]
    ResponseParsing(String),

    #[error("http client error: {0}")]
    Http(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub(crate) fn from_reqwest(e: reqwest::Error, base_url: &str) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_connect() {
            ClientError::Connection(base_url.to_string())
        } else if e.is_decode() {
            ClientError::ResponseParsing(e.to_string())
        } else {
            ClientError::Http(e.to_string())
        }
    }
}
