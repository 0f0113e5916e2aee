use super::Dispatch;
use crate::error::DispatchError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;

fn default_timeout() -> u64 {
    DEFAULT_WEBHOOK_TIMEOUT_SECS
}

/// `Config` block of a `builtin:webhook` manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    #[serde(rename = "Url")]
    pub url: String,
    #[serde(rename = "TimeoutSecs", default = "default_timeout")]
    pub timeout_secs: u64,
}

/// POSTs each payload unchanged to a fixed URL.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    url: reqwest::Url,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn from_config(config: WebhookConfig) -> Result<Self, String> {
        let url = reqwest::Url::parse(&config.url)
            .map_err(|e| format!("bad Url '{}': {}", config.url, e))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| e.to_string())?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl Dispatch for WebhookSink {
    async fn dispatch(&self, payload: &str, succeeded: bool) -> Result<String, DispatchError> {
        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header("X-Hostwatch-Succeeded", if succeeded { "true" } else { "false" })
            .body(payload.to_string())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.status().to_string())
    }
}
