use anyhow::Result;
use async_trait::async_trait;

use super::{View, ViewOutput};
use crate::api::ApiClient;

/// Unauthenticated liveness probe against `GET /health`.
#[derive(Debug, Clone, Default)]
pub struct HealthView;

#[async_trait]
impl View for HealthView {
    fn title(&self) -> &'static str {
        "Health"
    }

    async fn submit(&self, api: &ApiClient) -> Result<ViewOutput> {
        let health = api.health().await?;
        Ok(ViewOutput {
            text: format!("{}: {}", api.gateway().base_url(), health.status),
            json: serde_json::to_value(&health)?,
        })
    }
}
