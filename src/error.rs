//! The client's error type.
//!
//! [`ApiError::Status`] is the one "request failed" kind users see for
//! backend rejections. Its display form `"<status> <text>: <body>"` is shown
//! verbatim by every view.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("{status} {status_text}: {body}")]
    Status {
        status: u16,
        status_text: String,
        body: String,
    },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx payload did not match the expected schema.
    #[error("unexpected response from {path}: {reason}")]
    Decode { path: String, reason: String },

    /// A request body could not be serialized.
    #[error("could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The session token could not be persisted.
    #[error("session store error: {0}")]
    Session(String),
}

impl ApiError {
    /// HTTP status for [`ApiError::Status`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 401 responses.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
