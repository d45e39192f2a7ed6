//! Hybrid search form.

use anyhow::Result;
use async_trait::async_trait;

use super::{pretty, View, ViewOutput};
use crate::api::ApiClient;
use crate::config::SearchDefaults;
use crate::models::SearchParams;

#[derive(Debug, Clone)]
pub struct SearchForm {
    pub q: String,
    pub k: u32,
    pub min_score: f64,
    /// Restrict hits to chunks containing a query word.
    pub keyword_filter: bool,
    pub per_doc: u32,
    pub require_all_terms: Option<bool>,
    pub doc_limit: Option<u32>,
    pub chunks_per_doc: Option<u32>,
}

impl SearchForm {
    pub fn from_defaults(defaults: &SearchDefaults) -> Self {
        Self {
            q: defaults.q.clone(),
            k: defaults.k,
            min_score: defaults.min_score,
            keyword_filter: defaults.keyword_filter,
            per_doc: defaults.per_doc,
            require_all_terms: None,
            doc_limit: None,
            chunks_per_doc: None,
        }
    }

    pub fn params(&self) -> SearchParams {
        SearchParams {
            q: self.q.clone(),
            k: Some(self.k),
            min_score: Some(self.min_score),
            keyword_filter: Some(self.keyword_filter),
            per_doc: Some(self.per_doc),
            require_all_terms: self.require_all_terms,
            doc_limit: self.doc_limit,
            chunks_per_doc: self.chunks_per_doc,
        }
    }
}

impl Default for SearchForm {
    fn default() -> Self {
        Self::from_defaults(&SearchDefaults::default())
    }
}

#[async_trait]
impl View for SearchForm {
    fn title(&self) -> &'static str {
        "Semantic Search"
    }

    async fn submit(&self, api: &ApiClient) -> Result<ViewOutput> {
        let resp = api.search(&self.params()).await?;
        let json = serde_json::to_value(&resp)?;
        Ok(ViewOutput {
            text: pretty(&json),
            json,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = SearchForm::default().params();
        assert_eq!(params.q, "latte");
        assert_eq!(params.k, Some(5));
        assert_eq!(params.min_score, Some(0.25));
        assert_eq!(params.keyword_filter, Some(true));
        assert_eq!(params.per_doc, Some(2));
        assert_eq!(params.require_all_terms, None);
    }
}
