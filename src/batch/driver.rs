//! Sequential batch driver.
//!
//! For each index: derive the item seed, build the prompt, call the backend,
//! write the image, and append one ledger row. Item failures are recorded
//! with a `_FAILED` backend marker and never stop the batch; only setup
//! errors (credential, manifest, output directory) abort the run.
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::backend::{BackendKind, BackendSettings, ImageBackend};
use crate::batch::ledger::{Ledger, MetadataRecord, LEDGER_FILE};
use crate::batch::manifest::{Manifest, ManifestRow};
use crate::config::Config;
use crate::error::AppResult;
use crate::prompt::{GenerationRequest, PromptConstructor};

/// Exclusive upper bound for a master seed drawn from entropy.
const RANDOM_SEED_BOUND: u64 = 1 << 30;

#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub count: usize,
    pub output_dir: PathBuf,
    pub backend: BackendKind,
    pub manifest_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub backend_settings: BackendSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub master_seed: u64,
    pub output_dir: PathBuf,
    pub ledger_path: PathBuf,
}

/// `(master + index) mod 2^32`.
pub fn local_seed(master: u64, index: usize) -> u32 {
    master.wrapping_add(index as u64) as u32
}

/// Image filename for `index`, preferring the manifest row's id.
pub fn image_filename(index: usize, row: Option<&ManifestRow>) -> String {
    match row {
        Some(row) => format!("doctor_{}.png", doctor_id(index, row)),
        None => format!("doctor_{:03}.png", index + 1),
    }
}

fn doctor_id(index: usize, row: &ManifestRow) -> String {
    match row.id() {
        Some(id) => id.replace(['/', '\\'], "_"),
        None => index.to_string(),
    }
}

pub struct BatchDriver {
    backend: ImageBackend,
    prompts: PromptConstructor,
    manifest: Option<Manifest>,
}

impl BatchDriver {
    pub fn new(backend: ImageBackend, manifest: Option<Manifest>) -> Self {
        BatchDriver {
            backend,
            prompts: PromptConstructor::new(),
            manifest,
        }
    }

    /// Resolve the backend and manifest. Nothing is written if this fails.
    pub fn from_settings(config: &Config, settings: &BatchSettings) -> AppResult<Self> {
        let backend = ImageBackend::from_config(settings.backend, config, &settings.backend_settings)?;
        let manifest = match &settings.manifest_path {
            Some(path) => Some(Manifest::from_path(path)?),
            None => None,
        };
        Ok(BatchDriver::new(backend, manifest))
    }

    pub fn batch_size(&self, requested: usize) -> usize {
        self.manifest.as_ref().map_or(requested, Manifest::len)
    }

    pub async fn run(&self, count: usize, output_dir: &Path, seed: Option<u64>) -> AppResult<BatchSummary> {
        tokio::fs::create_dir_all(output_dir).await?;
        let ledger_path = output_dir.join(LEDGER_FILE);
        let mut ledger = Ledger::create(&ledger_path)?;

        let master_seed = seed.unwrap_or_else(|| rand::thread_rng().gen_range(0..RANDOM_SEED_BOUND));
        let total = self.batch_size(count);
        let kind = self.backend.kind();
        tracing::info!(total, backend = %kind, master_seed, "Starting batch into {}", output_dir.display());

        let mut succeeded = 0;
        for i in 0..total {
            let row = self.manifest.as_ref().and_then(|m| m.row(i));
            let request = self.prompts.build_request(i, local_seed(master_seed, i), kind);
            let filename = image_filename(i, row);
            let path = output_dir.join(&filename);

            let outcome = self.generate_item(&request, &path).await;
            let backend_label = match &outcome {
                Ok(bytes) => {
                    succeeded += 1;
                    tracing::info!("[{}/{}] saved {} ({} bytes)", i + 1, total, filename, bytes);
                    kind.as_str().to_string()
                }
                Err(e) => {
                    tracing::error!("Failed at index {}: {}", i, e);
                    kind.failed_label()
                }
            };

            ledger.append(&MetadataRecord {
                index: i,
                filename,
                doctor_id: row.map(|r| doctor_id(i, r)),
                doctor_name: row.and_then(ManifestRow::name).map(str::to_string),
                prompt: request.prompt,
                backend: backend_label,
                seed: request.seed,
            })?;
        }

        Ok(BatchSummary {
            total,
            succeeded,
            failed: total - succeeded,
            master_seed,
            output_dir: output_dir.to_path_buf(),
            ledger_path,
        })
    }

    /// Generate and persist one image, returning the number of bytes written.
    async fn generate_item(&self, request: &GenerationRequest, path: &Path) -> AppResult<usize> {
        let bytes = self.backend.generate(request).await?;
        if let Err(e) = tokio::fs::write(path, &bytes).await {
            let _ = tokio::fs::remove_file(path).await;
            return Err(e.into());
        }
        Ok(bytes.len())
    }
}

/// Set up and run a whole batch from settings.
pub async fn run_batch(config: &Config, settings: &BatchSettings) -> AppResult<BatchSummary> {
    let driver = BatchDriver::from_settings(config, settings)?;
    driver.run(settings.count, &settings.output_dir, settings.seed).await
}
