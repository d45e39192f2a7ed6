//! Single-document views: detail with preview, and delete.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use super::{View, ViewOutput};
use crate::api::ApiClient;
use crate::models::DocumentDetail;

#[derive(Debug, Clone)]
pub struct DocumentForm {
    pub id: i64,
}

#[async_trait]
impl View for DocumentForm {
    fn title(&self) -> &'static str {
        "Document"
    }

    async fn submit(&self, api: &ApiClient) -> Result<ViewOutput> {
        let doc = api.get_document(self.id).await?;
        Ok(ViewOutput {
            text: render_detail(&doc),
            json: serde_json::to_value(&doc)?,
        })
    }
}

fn render_detail(doc: &DocumentDetail) -> String {
    let mut out = String::new();
    out.push_str("--- Document ---\n");
    out.push_str(&format!("id:         {}\n", doc.id));
    out.push_str(&format!("filename:   {}\n", doc.filename));
    out.push_str(&format!(
        "mime_type:  {}\n",
        doc.mime_type.as_deref().unwrap_or("unknown")
    ));
    out.push_str(&format!("size:       {} bytes\n", doc.size));
    if let Some(ref created) = doc.created_at {
        out.push_str(&format!("created_at: {}\n", created));
    }
    if let Some(ref meta) = doc.metadata {
        out.push_str(&format!("metadata:   {}\n", meta));
    }
    out.push('\n');
    out.push_str("--- Preview ---\n");
    out.push_str(doc.preview.as_deref().unwrap_or("(no text extracted)"));
    out
}

#[derive(Debug, Clone)]
pub struct DeleteForm {
    pub id: i64,
}

#[async_trait]
impl View for DeleteForm {
    fn title(&self) -> &'static str {
        "Delete Document"
    }

    async fn submit(&self, api: &ApiClient) -> Result<ViewOutput> {
        api.delete_document(self.id).await?;
        Ok(ViewOutput {
            text: format!("Deleted document #{}", self.id),
            json: json!({ "deleted": self.id }),
        })
    }
}
