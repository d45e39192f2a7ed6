use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use super::{pretty, View, ViewOutput};
use crate::api::ApiClient;

/// Upload one local file.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub file: Option<PathBuf>,
}

impl UploadForm {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(file.into()),
        }
    }

    /// The upload button is disabled until a file is chosen.
    pub fn can_submit(&self) -> bool {
        self.file.is_some()
    }
}

#[async_trait]
impl View for UploadForm {
    fn title(&self) -> &'static str {
        "Upload Document"
    }

    async fn submit(&self, api: &ApiClient) -> Result<ViewOutput> {
        let path = self
            .file
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no file selected"))?;

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let resp = api.upload(&filename, bytes).await?;
        let json = serde_json::to_value(&resp)?;
        Ok(ViewOutput {
            text: pretty(&json),
            json,
        })
    }
}
