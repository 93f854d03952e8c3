use crate::application::ports::ContentFetcher;
use crate::domain::value_objects::ContentBlob;
use crate::shared::config::FetchConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// reqwest ベースのコンテンツ取得実装
pub struct HttpContentFetcher {
    client: Client,
}

impl HttpContentFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch(&self, url: &str) -> Result<ContentBlob, AppError> {
        debug!("Fetching content: {url}");

        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let data = response.bytes().await?;

        Ok(ContentBlob::new(data, content_type, Some(url.to_string())))
    }
}
