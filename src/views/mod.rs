//! Self-contained forms, one per backend feature.
//!
//! Each view holds its own editable fields (pre-populated with example
//! defaults) and exposes a single [`View::submit`] action that issues one
//! backend call. [`run_view`] turns the outcome into a [`ViewState`]: the
//! rendered payload, or the error message exactly as the gateway produced
//! it. No view retries, debounces, or cancels.

pub mod ask;
pub mod auth;
pub mod docs;
pub mod document;
pub mod health;
pub mod search;
pub mod uploader;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::api::ApiClient;
use crate::error::ApiError;

pub use ask::AskForm;
pub use auth::{AuthForm, AuthMode};
pub use docs::DocsForm;
pub use document::{DeleteForm, DocumentForm};
pub use health::HealthView;
pub use search::SearchForm;
pub use uploader::UploadForm;

/// A successful submission: the payload as JSON plus its terminal rendering.
#[derive(Debug, Clone)]
pub struct ViewOutput {
    pub json: Value,
    pub text: String,
}

/// What a view currently displays.
#[derive(Debug)]
pub enum ViewState {
    Idle,
    Done(ViewOutput),
    Failed(anyhow::Error),
}

impl ViewState {
    /// Error message shown to the user, if the last action failed.
    pub fn error_message(&self) -> Option<String> {
        match self {
            ViewState::Failed(e) => Some(e.to_string()),
            _ => None,
        }
    }

    /// True when the failure was the backend rejecting the session.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            ViewState::Failed(e) => e
                .downcast_ref::<ApiError>()
                .map(ApiError::is_unauthorized)
                .unwrap_or(false),
            _ => false,
        }
    }
}

#[async_trait]
pub trait View: Send + Sync {
    /// Heading shown above the view.
    fn title(&self) -> &'static str;

    /// The view's one primary action.
    async fn submit(&self, api: &ApiClient) -> Result<ViewOutput>;
}

/// Submit `view` once and capture the outcome.
pub async fn run_view(view: &dyn View, api: &ApiClient) -> ViewState {
    match view.submit(api).await {
        Ok(out) => ViewState::Done(out),
        Err(e) => {
            tracing::debug!(view = view.title(), error = %e, "view failed");
            ViewState::Failed(e)
        }
    }
}

pub(crate) fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_state_keeps_message_verbatim() {
        let state = ViewState::Failed(
            ApiError::Status {
                status: 500,
                status_text: "Internal Server Error".into(),
                body: "boom".into(),
            }
            .into(),
        );
        assert_eq!(
            state.error_message().as_deref(),
            Some("500 Internal Server Error: boom")
        );
        assert!(!state.is_unauthorized());
    }

    #[test]
    fn test_unauthorized_detected_through_anyhow() {
        let state = ViewState::Failed(
            ApiError::Status {
                status: 401,
                status_text: "Unauthorized".into(),
                body: String::new(),
            }
            .into(),
        );
        assert!(state.is_unauthorized());
        assert!(ViewState::Idle.error_message().is_none());
    }
}
