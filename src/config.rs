//! Env-driven configuration for the generator.
//!
//! Values are read from the process environment; `dotenv` is loaded on demand
//! by the binary. Defaults are provided for convenience during development and
//! every field can be overridden from the command line.
use std::env;
use std::path::PathBuf;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AUTOMATIC1111_URL: &str = "http://127.0.0.1:7860";
pub const DEFAULT_OUTPUT_DIR: &str = "./doctor_images";

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub automatic1111_url: String,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn dotenv_load() {
        dotenv::dotenv().ok();
    }

    pub fn new() -> Self {
        Config {
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            openai_base_url: env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
            automatic1111_url: env::var("AUTOMATIC1111_URL").unwrap_or_else(|_| DEFAULT_AUTOMATIC1111_URL.to_string()),
            output_dir: env::var("DOCTOR_IMAGES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        }
    }

    pub fn print_env_vars(&self) {
        let key = match &self.openai_api_key {
            Some(k) if k.len() > 8 => format!("{}…", k.chars().take(3).collect::<String>()),
            Some(_) => "<set>".to_string(),
            None => "<unset>".to_string(),
        };
        tracing::info!("OPENAI_API_KEY: {}", key);
        tracing::info!("OPENAI_BASE_URL: {}", self.openai_base_url);
        tracing::info!("AUTOMATIC1111_URL: {}", self.automatic1111_url);
        tracing::info!("DOCTOR_IMAGES_DIR: {}", self.output_dir.display());
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            automatic1111_url: DEFAULT_AUTOMATIC1111_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}
