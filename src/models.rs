//! Request and response schemas for the backend endpoints.
//!
//! Response types keep any field they do not name in `extra`, so
//! re-serializing a response reproduces what the backend sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============ Auth ============

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============ Documents ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: i64,
    pub filename: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub has_text: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDetail {
    pub id: i64,
    pub filename: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: i64,
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub ingested_chunks: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============ Search ============

/// Query parameters for `GET /api/search`.
///
/// `k` and `per_doc` are sent only when set and non-zero; the remaining
/// options whenever set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub q: String,
    pub k: Option<u32>,
    pub min_score: Option<f64>,
    pub keyword_filter: Option<bool>,
    pub per_doc: Option<u32>,
    pub require_all_terms: Option<bool>,
    pub doc_limit: Option<u32>,
    pub chunks_per_doc: Option<u32>,
}

impl SearchParams {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("q".to_string(), self.q.clone())];
        if let Some(k) = self.k.filter(|k| *k != 0) {
            pairs.push(("k".to_string(), k.to_string()));
        }
        if let Some(min_score) = self.min_score {
            pairs.push(("min_score".to_string(), min_score.to_string()));
        }
        if let Some(keyword_filter) = self.keyword_filter {
            pairs.push(("keyword_filter".to_string(), keyword_filter.to_string()));
        }
        if let Some(per_doc) = self.per_doc.filter(|p| *p != 0) {
            pairs.push(("per_doc".to_string(), per_doc.to_string()));
        }
        if let Some(all) = self.require_all_terms {
            pairs.push(("require_all_terms".to_string(), all.to_string()));
        }
        if let Some(limit) = self.doc_limit {
            pairs.push(("doc_limit".to_string(), limit.to_string()));
        }
        if let Some(n) = self.chunks_per_doc {
            pairs.push(("chunks_per_doc".to_string(), n.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub documents: Vec<SearchDocument>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One document group in a search result, ranked by its best chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDocument {
    pub document_id: i64,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub document_created_at: Option<String>,
    #[serde(default)]
    pub best_score: f64,
    #[serde(default)]
    pub total_matches: u64,
    #[serde(default)]
    pub snippets: Vec<SearchSnippet>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSnippet {
    #[serde(default)]
    pub chunk_index: Option<i64>,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub snippet: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============ Knowledge ============

/// Body of `POST /api/knowledge/ask`. Unset options are omitted.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AskRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_context_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_all_terms: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phrase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_file: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_answer_chars: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub document_id: Option<i64>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub chunk_index: Option<i64>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
