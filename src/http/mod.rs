pub mod client;

pub use client::AnalysisClient;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use url::Url;

/// Source of raw analysis payloads. The payload is untrusted: whatever
/// comes back is handed to the recovery pipeline as-is.
#[async_trait::async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Submits a subject password and returns the service's raw payload.
    async fn analyze(&self, subject: &str) -> Result<Value>;

    /// Backend name for display.
    fn name(&self) -> &str;
}

/// AI-assisted analysis service reached over HTTP.
pub struct RemoteBackend {
    client: AnalysisClient,
    endpoint: Url,
}

impl RemoteBackend {
    pub fn new(endpoint: Url, client: AnalysisClient) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait::async_trait]
impl AnalysisBackend for RemoteBackend {
    async fn analyze(&self, subject: &str) -> Result<Value> {
        let body = json!({ "password": subject });
        self.client
            .post_json(self.endpoint.as_str(), &body)
            .await
            .with_context(|| format!("analysis request to {} failed", self.endpoint))
    }

    fn name(&self) -> &str {
        "remote analysis service"
    }
}
