//! error types
//!
//! structured errors for config, http, json, graphql responses, and the
//! selection/execution layer.

use crate::graphql::{GraphQlError, NOT_FOUND_CATEGORY};
use std::fmt;

/// library result type
pub type Result<T> = std::result::Result<T, Error>;

/// error type for the client, the executor, and resource services
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("graphql error: {message}")]
    GraphQl {
        /// http status if available
        status: Option<u16>,
        /// graphql error list
        errors: Vec<GraphQlError>,
        /// raw response body
        body: String,
        /// top-level message
        message: String,
    },

    #[error("invalid field spec: {0}")]
    InvalidFieldSpec(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),

    #[error("{capability} method is not implemented")]
    NotImplemented {
        /// name of the unsupported capability
        capability: &'static str,
    },
}

impl Error {
    /// true if the error looks like an auth failure
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::GraphQl { status: Some(401 | 403), .. })
            || matches!(self, Error::Http(err) if err.status() == Some(reqwest::StatusCode::UNAUTHORIZED))
    }

    /// category extension of the first graphql error, if any
    pub fn category(&self) -> Option<&str> {
        match self {
            Error::GraphQl { errors, .. } => errors.first().and_then(GraphQlError::category),
            _ => None,
        }
    }

    /// true if the server classified the failure as a missing resource
    pub fn is_not_found(&self) -> bool {
        self.category() == Some(NOT_FOUND_CATEGORY)
    }
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
