//! Login and register→login.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use super::{View, ViewOutput};
use crate::api::ApiClient;
use crate::gateway::Payload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

#[derive(Debug, Clone)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            mode: AuthMode::Login,
            email: "demo@example.com".to_string(),
            password: "demo1234".to_string(),
            name: "Demo User".to_string(),
        }
    }
}

impl AuthForm {
    pub fn button_label(&self) -> &'static str {
        match self.mode {
            AuthMode::Login => "Login",
            AuthMode::Register => "Register & Login",
        }
    }
}

#[async_trait]
impl View for AuthForm {
    fn title(&self) -> &'static str {
        "Auth"
    }

    /// In register mode the account is created first; either way the form
    /// ends by logging in, which stores the session token.
    async fn submit(&self, api: &ApiClient) -> Result<ViewOutput> {
        let registered = if self.mode == AuthMode::Register {
            Some(
                api.register(&self.email, &self.password, Some(&self.name))
                    .await?,
            )
        } else {
            None
        };

        let token = api.login(&self.email, &self.password).await?;

        let mut out = json!({
            "email": self.email,
            "token_type": token.token_type,
        });
        if let Some(payload) = registered {
            out["registered"] = match payload {
                Payload::Json(v) => v,
                Payload::Text(t) => json!(t),
            };
        }

        Ok(ViewOutput {
            text: format!("{}: signed in as {}", self.button_label(), self.email),
            json: out,
        })
    }
}
