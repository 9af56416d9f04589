//! Client for a local Automatic1111 Stable Diffusion WebUI.
//!
//! `generate` posts to `/sdapi/v1/txt2img` and decodes the first entry of the
//! `images` array. Transport failures and non-success statuses are retried; a
//! success response that carries no usable image is returned at once.
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::backend::RetryPolicy;
use crate::error::{AppError, AppResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq)]
pub struct Txt2ImgParams {
    pub steps: u32,
    pub sampler: String,
    pub cfg_scale: f64,
    pub width: u32,
    pub height: u32,
}

impl Default for Txt2ImgParams {
    fn default() -> Self {
        Txt2ImgParams {
            steps: 20,
            sampler: "Euler a".to_string(),
            cfg_scale: 7.0,
            width: 1024,
            height: 1024,
        }
    }
}

#[derive(Debug, Serialize)]
struct Txt2ImgRequest<'a> {
    prompt: &'a str,
    negative_prompt: &'a str,
    steps: u32,
    sampler_index: &'a str,
    cfg_scale: f64,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct Txt2ImgResponse {
    images: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct Automatic1111Client {
    client: Client,
    base_url: String,
    params: Txt2ImgParams,
    retry: RetryPolicy,
}

impl Automatic1111Client {
    pub fn new(base_url: String, params: Txt2ImgParams) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Automatic1111Client {
            client: Client::new(),
            base_url: base,
            params,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn generate(&self, prompt: &str, negative_prompt: &str) -> AppResult<Vec<u8>> {
        let url = format!("{}/sdapi/v1/txt2img", self.base_url);
        let body = Txt2ImgRequest {
            prompt,
            negative_prompt,
            steps: self.params.steps,
            sampler_index: &self.params.sampler,
            cfg_scale: self.params.cfg_scale,
            width: self.params.width,
            height: self.params.height,
        };
        tracing::debug!("txt2img payload: {:?}", body);

        let mut last = None;
        let mut attempts = 0;
        for attempt in 0..self.retry.attempts {
            attempts = attempt + 1;
            let sent = self.client.post(&url)
                .json(&body)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await;

            let failure = match sent {
                Ok(response) if response.status().is_success() => {
                    return decode_first_image(response).await.map_err(|e| AppError::Backend {
                        backend: "automatic1111",
                        attempts,
                        source: Box::new(e),
                    });
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_else(|_| "Unable to read error body".to_string());
                    AppError::Status { status, body }
                }
                Err(e) => AppError::HttpClient(e),
            };
            tracing::warn!(attempt = attempts, max = self.retry.attempts, "txt2img request failed: {}", failure);
            last = Some(failure);
            self.retry.backoff(attempt).await;
        }

        Err(AppError::Backend {
            backend: "automatic1111",
            attempts,
            source: Box::new(last.unwrap_or_else(|| AppError::MalformedResponse("no attempts made".to_string()))),
        })
    }
}

async fn decode_first_image(response: reqwest::Response) -> AppResult<Vec<u8>> {
    let parsed: Txt2ImgResponse = response
        .json()
        .await
        .map_err(|e| AppError::MalformedResponse(format!("txt2img body is not valid JSON: {}", e)))?;
    let first = parsed
        .images
        .and_then(|images| images.into_iter().next())
        .ok_or_else(|| AppError::MalformedResponse("automatic1111 response missing images".to_string()))?;
    Ok(BASE64.decode(first)?)
}
