//! Typed endpoint calls.
//!
//! One method per backend endpoint, all routed through the [`Gateway`].
//! [`ApiClient::register`] and [`ApiClient::login`] are sent anonymously,
//! so a rejected password leaves an existing session alone.

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::gateway::{Gateway, Payload, RequestOptions};
use crate::models::{
    AskRequest, AskResponse, DocumentDetail, DocumentSummary, HealthResponse, LoginRequest,
    Profile, RegisterRequest, SearchParams, SearchResponse, TokenResponse, UploadResponse,
};
use crate::session::SessionStore;

pub struct ApiClient {
    gateway: Gateway,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        Ok(Self {
            gateway: Gateway::new(base_url, session)?,
        })
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn token(&self) -> Option<String> {
        self.gateway.session().get_token()
    }

    /// Clear the stored token.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.gateway
            .session()
            .set_token(None)
            .map_err(|e| ApiError::Session(e.to_string()))
    }

    // ============ auth ============

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Payload, ApiError> {
        let body = to_json(&RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.map(str::to_string),
        })?;
        self.gateway
            .request(
                "/api/auth/register",
                RequestOptions::post_json(body).anonymous(),
            )
            .await
    }

    /// Log in and persist the returned access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let body = to_json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let token: TokenResponse = self
            .gateway
            .request_json("/api/auth/login", RequestOptions::post_json(body).anonymous())
            .await?;
        self.gateway
            .session()
            .set_token(Some(&token.access_token))
            .map_err(|e| ApiError::Session(e.to_string()))?;
        info!(email, "signed in");
        Ok(token)
    }

    pub async fn profile(&self) -> Result<Profile, ApiError> {
        self.gateway
            .request_json("/api/auth/profile", RequestOptions::get())
            .await
    }

    // ============ documents ============

    /// Upload one file as the multipart field `file`.
    pub async fn upload(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part("file", part);
        self.gateway
            .request_json("/api/documents/upload", RequestOptions::post_multipart(form))
            .await
    }

    /// List documents, optionally filtered by a filename substring.
    pub async fn list_documents(
        &self,
        filter: Option<&str>,
    ) -> Result<Vec<DocumentSummary>, ApiError> {
        let mut opts = RequestOptions::get();
        if let Some(q) = filter.filter(|q| !q.is_empty()) {
            opts = opts.query(vec![("q".to_string(), q.to_string())]);
        }
        self.gateway.request_json("/api/documents", opts).await
    }

    pub async fn get_document(&self, id: i64) -> Result<DocumentDetail, ApiError> {
        self.gateway
            .request_json(&format!("/api/documents/{}", id), RequestOptions::get())
            .await
    }

    pub async fn delete_document(&self, id: i64) -> Result<(), ApiError> {
        self.gateway
            .request(&format!("/api/documents/{}", id), RequestOptions::delete())
            .await?;
        Ok(())
    }

    // ============ search / knowledge ============

    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse, ApiError> {
        self.gateway
            .request_json("/api/search", RequestOptions::get().query(params.to_query()))
            .await
    }

    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError> {
        let body = to_json(request)?;
        self.gateway
            .request_json("/api/knowledge/ask", RequestOptions::post_json(body))
            .await
    }

    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.gateway
            .request_json("/health", RequestOptions::get())
            .await
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(ApiError::Encode)
}
