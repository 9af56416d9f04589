//! Image-generation backends.
//!
//! Two interchangeable adapters share one contract: `generate(prompt)` returns
//! raw image bytes, or an `AppError::Backend` carrying the last cause once the
//! retry budget is spent.
pub mod automatic1111;
pub mod openai;

use std::fmt;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::Config;
use crate::error::AppResult;
use crate::prompt::GenerationRequest;

pub use automatic1111::{Automatic1111Client, Txt2ImgParams};
pub use openai::OpenAiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    #[value(name = "openai")]
    OpenAi,
    #[value(name = "automatic1111")]
    Automatic1111,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::OpenAi => "openai",
            BackendKind::Automatic1111 => "automatic1111",
        }
    }

    /// Ledger marker for items whose generation failed.
    pub fn failed_label(self) -> String {
        format!("{}_FAILED", self.as_str())
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Linear backoff: attempt `n` (zero-based) waits `base_delay + step * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
    pub step: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32) -> Self {
        RetryPolicy {
            attempts: attempts.max(1),
            base_delay: Duration::from_secs(1),
            step: Duration::from_secs(2),
        }
    }

    /// Same budget, no sleeping between attempts.
    pub fn immediate(attempts: u32) -> Self {
        RetryPolicy {
            attempts: attempts.max(1),
            base_delay: Duration::ZERO,
            step: Duration::ZERO,
        }
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay + self.step * attempt
    }

    pub fn is_last(&self, attempt: u32) -> bool {
        attempt + 1 >= self.attempts
    }

    pub(crate) async fn backoff(&self, attempt: u32) {
        if !self.is_last(attempt) {
            tokio::time::sleep(self.delay(attempt)).await;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(3)
    }
}

/// Per-run knobs for whichever backend is selected.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub size: String,
    pub model: Option<String>,
    pub txt2img: Txt2ImgParams,
    pub retry: RetryPolicy,
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            size: "1024x1024".to_string(),
            model: None,
            txt2img: Txt2ImgParams::default(),
            retry: RetryPolicy::default(),
        }
    }
}

pub enum ImageBackend {
    OpenAi(OpenAiClient),
    Automatic1111(Automatic1111Client),
}

impl ImageBackend {
    /// Build the selected adapter. Fails without touching the network when
    /// the cloud backend has no credential.
    pub fn from_config(kind: BackendKind, config: &Config, settings: &BackendSettings) -> AppResult<Self> {
        match kind {
            BackendKind::OpenAi => {
                let client = OpenAiClient::from_config(config, settings.size.clone(), settings.model.clone())?
                    .with_retry(settings.retry);
                Ok(ImageBackend::OpenAi(client))
            }
            BackendKind::Automatic1111 => {
                let client = Automatic1111Client::new(config.automatic1111_url.clone(), settings.txt2img.clone())
                    .with_retry(settings.retry);
                Ok(ImageBackend::Automatic1111(client))
            }
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            ImageBackend::OpenAi(_) => BackendKind::OpenAi,
            ImageBackend::Automatic1111(_) => BackendKind::Automatic1111,
        }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> AppResult<Vec<u8>> {
        tracing::debug!(index = request.index, seed = request.seed, backend = %request.backend, "Submitting image request");
        match self {
            ImageBackend::OpenAi(client) => client.generate(&request.prompt).await,
            ImageBackend::Automatic1111(client) => {
                client.generate(&request.prompt, &request.negative_prompt()).await
            }
        }
    }
}
