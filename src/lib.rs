//! Doctor portrait batch generator library
//!
//! Modules:
//! - `prompt`: Seeded prompt construction from fixed slot tables.
//! - `backend`: OpenAI Images and Automatic1111 adapters with retry/backoff.
//! - `batch`: Manifest input, metadata ledger, and the sequential driver.
//! - `config`: Env-driven configuration loader.
//! - `error`: Common error type and alias.
//!
//! Re-exports are provided for common types: `Config`, `ImageBackend`,
//! `PromptConstructor`, and `BatchDriver`.
pub mod backend;
pub mod batch;
pub mod config;
pub mod error;
pub mod prompt;

pub use backend::{BackendKind, ImageBackend};
pub use batch::BatchDriver;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use prompt::PromptConstructor;
