//! Top-level authentication gate.
//!
//! The controller decides which views are reachable:
//!
//! ```text
//!   Unauthenticated ──login──▶ Authenticating ──profile ok──▶ Authenticated
//!          ▲                         │                             │
//!          └──── profile failed ─────┘◀──── 401 from any view ─────┘
//! ```
//!
//! Any profile failure clears the stored token and leaves an error banner.

use serde::Serialize;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::models::Profile;
use crate::views::ViewState;

#[derive(Debug, Clone)]
pub enum AuthState {
    Unauthenticated { error: Option<String> },
    Authenticating,
    Authenticated(Profile),
}

/// Views the controller can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Auth,
    Uploader,
    Docs,
    Search,
    Ask,
}

const SIGNED_OUT_VIEWS: &[ViewKind] = &[ViewKind::Auth];
const SIGNED_IN_VIEWS: &[ViewKind] = &[
    ViewKind::Uploader,
    ViewKind::Docs,
    ViewKind::Search,
    ViewKind::Ask,
];

pub struct Controller {
    api: ApiClient,
    state: AuthState,
}

impl Controller {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: AuthState::Unauthenticated { error: None },
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn profile(&self) -> Option<&Profile> {
        match &self.state {
            AuthState::Authenticated(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.profile().is_some()
    }

    /// Initial load: fetch the profile when a token is stored.
    pub async fn mount(&mut self) -> &AuthState {
        self.load_profile().await;
        &self.state
    }

    /// Called after a successful login.
    pub async fn on_authed(&mut self) -> &AuthState {
        self.load_profile().await;
        &self.state
    }

    async fn load_profile(&mut self) {
        if self.api.token().is_none() {
            self.state = AuthState::Unauthenticated { error: None };
            return;
        }

        self.state = AuthState::Authenticating;
        match self.api.profile().await {
            Ok(profile) => {
                info!(email = %profile.email, "session restored");
                self.state = AuthState::Authenticated(profile);
            }
            Err(e) => {
                warn!(error = %e, "profile fetch failed, signing out");
                if let Err(clear_err) = self.api.logout() {
                    warn!(error = %clear_err, "failed to clear session");
                }
                self.state = AuthState::Unauthenticated {
                    error: Some(e.to_string()),
                };
            }
        }
    }

    /// React to a view's outcome; a 401 sends the controller back to Auth.
    pub fn observe(&mut self, outcome: &ViewState) {
        if outcome.is_unauthorized() {
            self.state = AuthState::Unauthenticated {
                error: outcome.error_message(),
            };
        }
    }

    pub fn logout(&mut self) -> anyhow::Result<()> {
        self.api.logout()?;
        self.state = AuthState::Unauthenticated { error: None };
        Ok(())
    }

    pub fn visible_views(&self) -> &'static [ViewKind] {
        match self.state {
            AuthState::Authenticated(_) => SIGNED_IN_VIEWS,
            _ => SIGNED_OUT_VIEWS,
        }
    }

    /// Header line: the signed-in email, or `Not signed in`.
    pub fn header(&self) -> String {
        match &self.state {
            AuthState::Authenticated(p) => format!("Signed in as {}", p.email),
            AuthState::Authenticating => "Signing in…".to_string(),
            AuthState::Unauthenticated { .. } => "Not signed in".to_string(),
        }
    }

    /// Error banner from the last failed profile load, if any.
    pub fn banner(&self) -> Option<String> {
        match &self.state {
            AuthState::Unauthenticated { error: Some(e) } => Some(format!("Error: {}", e)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;
    use std::sync::Arc;

    fn controller() -> Controller {
        let api = ApiClient::new("http://127.0.0.1:9", Arc::new(MemorySessionStore::new())).unwrap();
        Controller::new(api)
    }

    #[tokio::test]
    async fn test_no_token_shows_only_auth() {
        let mut c = controller();
        c.mount().await;
        assert_eq!(c.visible_views(), &[ViewKind::Auth]);
        assert_eq!(c.header(), "Not signed in");
        assert!(c.banner().is_none());
    }

    #[test]
    fn test_observe_unauthorized_reverts() {
        let mut c = controller();
        c.state = AuthState::Authenticated(Profile {
            id: Some(1),
            email: "demo@example.com".into(),
            role: None,
            extra: Default::default(),
        });
        assert_eq!(c.visible_views().len(), 4);

        let outcome = ViewState::Failed(
            crate::error::ApiError::Status {
                status: 401,
                status_text: "Unauthorized".into(),
                body: "expired".into(),
            }
            .into(),
        );
        c.observe(&outcome);
        assert!(!c.is_authenticated());
        assert_eq!(c.banner().as_deref(), Some("Error: 401 Unauthorized: expired"));
    }
}
