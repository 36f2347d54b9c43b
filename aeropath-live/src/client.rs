use async_trait::async_trait;

use crate::wire::{LiveSearchRequest, LiveSearchResponse};

#[derive(Debug, thiserror::Error)]
pub enum LiveSearchError {
    #[error("live search transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("live search returned status {0}")]
    Status(u16),

    #[error("live search timed out after {0:?}")]
    TimedOut(std::time::Duration),
}

/// Outbound seam to the live-search backend, one POST per loyalty program.
#[async_trait]
pub trait LiveSearchClient: Send + Sync {
    async fn search(
        &self,
        program: &str,
        request: &LiveSearchRequest,
    ) -> Result<LiveSearchResponse, LiveSearchError>;
}

/// Real backend client. Each program has its own endpoint under the base
/// URL.
pub struct HttpLiveSearchClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpLiveSearchClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint_for(&self, program: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            program.to_lowercase()
        )
    }
}

#[async_trait]
impl LiveSearchClient for HttpLiveSearchClient {
    async fn search(
        &self,
        program: &str,
        request: &LiveSearchRequest,
    ) -> Result<LiveSearchResponse, LiveSearchError> {
        let url = self.endpoint_for(program);
        tracing::debug!(%url, from = %request.from, to = %request.to, "live search lookup");

        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LiveSearchError::Status(status.as_u16()));
        }
        Ok(response.json::<LiveSearchResponse>().await?)
    }
}
