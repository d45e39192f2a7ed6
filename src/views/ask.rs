//! Retrieval-augmented question answering.

use anyhow::Result;
use async_trait::async_trait;

use super::{pretty, View, ViewOutput};
use crate::api::ApiClient;
use crate::config::AskDefaults;
use crate::models::{AskRequest, AskResponse};

#[derive(Debug, Clone)]
pub struct AskForm {
    pub question: String,
    pub k: u32,
    pub max_context_tokens: u32,
    /// `ollama`, `openai`, or `hf`.
    pub provider: String,
    pub model: String,
    pub require_all_terms: bool,
    pub phrase: Option<String>,
    pub min_score: f64,
    pub per_file: u32,
    pub max_answer_chars: u32,
}

impl AskForm {
    pub fn from_defaults(defaults: &AskDefaults) -> Self {
        Self {
            question: defaults.question.clone(),
            k: defaults.k,
            max_context_tokens: defaults.max_context_tokens,
            provider: defaults.provider.clone(),
            model: defaults.model.clone(),
            require_all_terms: defaults.require_all_terms,
            phrase: None,
            min_score: defaults.min_score,
            per_file: defaults.per_file,
            max_answer_chars: defaults.max_answer_chars,
        }
    }

    pub fn request(&self) -> AskRequest {
        AskRequest {
            question: self.question.clone(),
            k: Some(self.k),
            max_context_tokens: Some(self.max_context_tokens),
            provider: Some(self.provider.clone()).filter(|p| !p.is_empty()),
            model: Some(self.model.clone()).filter(|m| !m.is_empty()),
            require_all_terms: Some(self.require_all_terms),
            phrase: self.phrase.clone(),
            min_score: Some(self.min_score),
            per_file: Some(self.per_file),
            max_answer_chars: Some(self.max_answer_chars),
        }
    }
}

impl Default for AskForm {
    fn default() -> Self {
        Self::from_defaults(&AskDefaults::default())
    }
}

#[async_trait]
impl View for AskForm {
    fn title(&self) -> &'static str {
        "Ask (RAG)"
    }

    async fn submit(&self, api: &ApiClient) -> Result<ViewOutput> {
        let resp = api.ask(&self.request()).await?;
        Ok(ViewOutput {
            text: render_answer(&resp),
            json: serde_json::to_value(&resp)?,
        })
    }
}

fn render_answer(resp: &AskResponse) -> String {
    let citations = serde_json::to_value(&resp.citations).unwrap_or_default();
    format!(
        "Answer\n{}\n\nCitations\n{}",
        resp.answer,
        pretty(&citations)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[test]
    fn test_default_request_body() {
        let body = serde_json::to_value(AskForm::default().request()).unwrap();
        assert_eq!(
            body,
            json!({
                "question": "What is the name of server in \"BEAN & BREW COFFEE SHOP\"?",
                "k": 6,
                "max_context_tokens": 800,
                "provider": "ollama",
                "model": "phi3:3.8b",
                "require_all_terms": false,
                "min_score": 0.2,
                "per_file": 1,
                "max_answer_chars": 140
            })
        );
    }

    #[test]
    fn test_phrase_sent_when_set() {
        let form = AskForm {
            phrase: Some("flat white".into()),
            ..Default::default()
        };
        assert_eq!(form.request().phrase.as_deref(), Some("flat white"));
    }

    #[test]
    fn test_render_answer_sections() {
        let resp = AskResponse {
            answer: "Not found in the provided documents.".into(),
            citations: vec![],
            extra: Map::new(),
        };
        assert_eq!(
            render_answer(&resp),
            "Answer\nNot found in the provided documents.\n\nCitations\n[]"
        );
    }
}
