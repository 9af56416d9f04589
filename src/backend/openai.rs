//! OpenAI Images API adapter.
//!
//! - `generate` posts to `<base>/images/generations` and returns the first
//!   image, decoding `b64_json` or fetching `url`.
//! - Every failure is retried under the client's `RetryPolicy`.
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::backend::RetryPolicy;
use crate::config::Config;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize)]
struct ImagesRequest<'a> {
    prompt: &'a str,
    n: u32,
    size: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
    url: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    size: String,
    model: Option<String>,
    retry: RetryPolicy,
}

impl OpenAiClient {
    pub fn new(base_url: String, api_key: String, size: String) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        OpenAiClient {
            client: Client::new(),
            base_url: base,
            api_key,
            size,
            model: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Requires `OPENAI_API_KEY` to have been present when `config` was loaded.
    pub fn from_config(config: &Config, size: String, model: Option<String>) -> AppResult<Self> {
        let key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| AppError::Config("OPENAI_API_KEY not set in environment".to_string()))?;
        Ok(OpenAiClient::new(config.openai_base_url.clone(), key, size).with_model(model))
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn generate(&self, prompt: &str) -> AppResult<Vec<u8>> {
        let mut last = None;
        for attempt in 0..self.retry.attempts {
            match self.generate_once(prompt).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    tracing::warn!(attempt = attempt + 1, max = self.retry.attempts, "OpenAI image request failed: {}", e);
                    last = Some(e);
                    self.retry.backoff(attempt).await;
                }
            }
        }
        Err(AppError::Backend {
            backend: "openai",
            attempts: self.retry.attempts,
            source: Box::new(last.unwrap_or_else(|| AppError::MalformedResponse("no attempts made".to_string()))),
        })
    }

    async fn generate_once(&self, prompt: &str) -> AppResult<Vec<u8>> {
        let url = format!("{}/images/generations", self.base_url);
        let body = ImagesRequest {
            prompt,
            n: 1,
            size: &self.size,
            model: self.model.as_deref(),
        };
        tracing::debug!("Image request payload: {:?}", body);

        let response = self.client.post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(AppError::Status { status, body });
        }

        let parsed: ImagesResponse = response.json().await?;
        let first = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| AppError::MalformedResponse("response contained no image data".to_string()))?;

        if let Some(b64) = first.b64_json {
            Ok(BASE64.decode(b64)?)
        } else if let Some(url) = first.url {
            self.download(&url).await
        } else {
            Err(AppError::MalformedResponse("image entry missing b64_json and url".to_string()))
        }
    }

    async fn download(&self, url: &str) -> AppResult<Vec<u8>> {
        tracing::debug!("Fetching generated image from {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Status { status, body });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
