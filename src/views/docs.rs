//! Document listing with a filename filter.

use anyhow::Result;
use async_trait::async_trait;

use super::{View, ViewOutput};
use crate::api::ApiClient;
use crate::models::DocumentSummary;

#[derive(Debug, Clone, Default)]
pub struct DocsForm {
    /// Filename substring; empty means no filter.
    pub filter: String,
}

#[async_trait]
impl View for DocsForm {
    fn title(&self) -> &'static str {
        "Documents"
    }

    async fn submit(&self, api: &ApiClient) -> Result<ViewOutput> {
        let filter = Some(self.filter.trim()).filter(|f| !f.is_empty());
        let docs = api.list_documents(filter).await?;
        Ok(ViewOutput {
            text: render_documents(&docs),
            json: serde_json::to_value(&docs)?,
        })
    }
}

/// One card per document, or a placeholder line for an empty list.
pub fn render_documents(docs: &[DocumentSummary]) -> String {
    if docs.is_empty() {
        return "No documents yet.".to_string();
    }

    let mut out = String::new();
    for d in docs {
        out.push_str(&format!(
            "{} [{}]  id #{}\n",
            d.filename,
            d.mime_type.as_deref().unwrap_or("unknown"),
            d.id
        ));
        out.push_str(&format!(
            "  {:.1} KB • {}\n",
            d.size as f64 / 1024.0,
            if d.has_text { "has text" } else { "no text" }
        ));
    }
    out.trim_end().to_string()
}
