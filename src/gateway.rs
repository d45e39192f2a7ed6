//! The single HTTP entry point of the client.
//!
//! [`Gateway::request`] attaches the bearer token, turns any non-2xx answer
//! into [`ApiError::Status`], and decodes the body as JSON or text based on
//! the declared `content-type`. Nothing else in the crate talks to
//! `reqwest` directly.
//!
//! ```text
//! view form ──▶ ApiClient ──▶ Gateway::request ──▶ backend
//!                                 │
//!                                 ├── Authorization: Bearer <token>
//!                                 ├── non-2xx  → ApiError::Status
//!                                 └── 2xx      → Payload::Json | Payload::Text
//! ```

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::session::SessionStore;

/// Body of an outgoing request.
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(reqwest::multipart::Form),
}

/// Per-request options: method, extra headers, query pairs, and body.
///
/// An `anonymous` request is sent without the stored token, so its 401
/// never touches the session.
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub anonymous: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
            anonymous: false,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    pub fn post_json(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: RequestBody::Json(body),
            ..Self::default()
        }
    }

    pub fn post_multipart(form: reqwest::multipart::Form) -> Self {
        Self {
            method: Method::POST,
            body: RequestBody::Multipart(form),
            ..Self::default()
        }
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Send without the session token.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

/// A decoded 2xx response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    /// Pretty-printed JSON, or the raw text.
    pub fn render(&self) -> String {
        match self {
            Payload::Json(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
            Payload::Text(t) => t.clone(),
        }
    }
}

/// Shared HTTP client bound to one backend and one session.
pub struct Gateway {
    base_url: String,
    http: reqwest::Client,
    session: Arc<dyn SessionStore>,
}

impl Gateway {
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("bkh/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Perform one request against `base_url + path`.
    ///
    /// A 401 on a request that carried a token clears the stored session
    /// before the error is returned. Anonymous requests carry none.
    pub async fn request(&self, path: &str, opts: RequestOptions) -> Result<Payload, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(opts.method.clone(), &url);

        for (name, value) in &opts.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let token = if opts.anonymous {
            None
        } else {
            self.session.get_token()
        };
        if let Some(ref t) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", t));
        }

        if !opts.query.is_empty() {
            builder = builder.query(&opts.query);
        }

        builder = match opts.body {
            RequestBody::Empty => builder,
            RequestBody::Json(v) => builder.json(&v),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        debug!(method = %opts.method, path, authenticated = token.is_some(), "request");
        let resp = builder.send().await?;
        let status = resp.status();
        debug!(method = %opts.method, path, status = status.as_u16(), "response");

        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(path, error = %e, "could not read error body");
                    String::new()
                }
            };
            if status == StatusCode::UNAUTHORIZED && token.is_some() {
                warn!(path, "authentication rejected, clearing session");
                self.session
                    .set_token(None)
                    .map_err(|e| ApiError::Session(e.to_string()))?;
            }
            return Err(ApiError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);

        if is_json {
            let value: Value = resp.json().await.map_err(|e| ApiError::Decode {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
            Ok(Payload::Json(value))
        } else {
            Ok(Payload::Text(resp.text().await?))
        }
    }

    /// Like [`Gateway::request`], then decode the JSON payload into `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        path: &str,
        opts: RequestOptions,
    ) -> Result<T, ApiError> {
        match self.request(path, opts).await? {
            Payload::Json(value) => serde_json::from_value(value).map_err(|e| ApiError::Decode {
                path: path.to_string(),
                reason: e.to_string(),
            }),
            Payload::Text(text) => Err(ApiError::Decode {
                path: path.to_string(),
                reason: format!("expected JSON, got text: {}", truncate(&text, 120)),
            }),
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
